// src/brut.rs
//
// Devinette brute sur GF(p) : ansatz et algèbre linéaire.
//
// Pour un couple (ordre, degré) donné, on dresse la matrice dont les
// colonnes sont les suites ( (n+j)^i · a(n+j) )ₙ (cas décalage, avec
// n ↦ qⁿ pour le cas q) ou les séries ( xⁱ · f⁽ʲ⁾ )ₙ (cas différentiel),
// et on calcule une base du noyau à droite. Chaque vecteur du noyau,
// redécoupé en tranches de degré+1 et corrigé par σʲ, donne un opérateur
// annulateur.
//
// Le nombre minimal de termes pour (r, d) est (r+1)·(d+2) : autant
// d'inconnues que (r+1)·(d+1), plus r+1 contraintes excédentaires pour
// écarter les solutions parasites.

use tracing::debug;

use crate::algebre::Generateur;
use crate::erreur::ErreurDevin;
use crate::operateur::OperateurZp;
use crate::polyzp::PolyZp;
use crate::zp;

/// Calcul du noyau à droite d'une matrice sur GF(p), remplaçable par
/// l'appelant (profilage, solveur structuré).
pub type Resolveur = fn(Vec<Vec<u64>>, u64) -> Vec<Vec<u64>>;

/// Nombre minimal de termes pour chercher en (ordre, degré).
pub fn longueur_minimale(ordre: usize, degre: usize) -> usize {
    (ordre + 1) * (degre + 2)
}

/* ------------------------ noyau à droite ------------------------ */

/// Base du noyau à droite par Gauss-Jordan. Les vecteurs renvoyés sont
/// indexés par les colonnes libres, en ordre croissant.
pub fn noyau_droit(mut lignes: Vec<Vec<u64>>, p: u64) -> Vec<Vec<u64>> {
    let n_cols = lignes.first().map_or(0, Vec::len);
    let mut pivots: Vec<(usize, usize)> = Vec::new(); // (ligne, colonne)
    let mut ligne_courante = 0usize;

    for col in 0..n_cols {
        // cherche un pivot non nul dans la colonne
        let Some(l) = (ligne_courante..lignes.len()).find(|&l| lignes[l][col] != 0) else {
            continue;
        };
        lignes.swap(ligne_courante, l);

        let inv = match zp::inverse(lignes[ligne_courante][col], p) {
            Some(v) => v,
            None => continue,
        };
        for x in lignes[ligne_courante].iter_mut() {
            *x = zp::multiplie(*x, inv, p);
        }

        for l in 0..lignes.len() {
            if l != ligne_courante && lignes[l][col] != 0 {
                let f = lignes[l][col];
                for c in col..n_cols {
                    let t = zp::multiplie(f, lignes[ligne_courante][c], p);
                    lignes[l][c] = zp::soustrait(lignes[l][c], t, p);
                }
            }
        }

        pivots.push((ligne_courante, col));
        ligne_courante += 1;
        if ligne_courante == lignes.len() {
            break;
        }
    }

    let colonnes_pivot: Vec<usize> = pivots.iter().map(|&(_, c)| c).collect();
    let mut base = Vec::new();
    for libre in 0..n_cols {
        if colonnes_pivot.contains(&libre) {
            continue;
        }
        let mut v = vec![0u64; n_cols];
        v[libre] = 1;
        for &(l, c) in &pivots {
            v[c] = zp::oppose(lignes[l][libre], p);
        }
        base.push(v);
    }
    base
}

/* ------------------------ fenêtre de données ------------------------ */

fn fenetre<'a>(
    donnees: &'a [u64],
    minimum: usize,
    coupe: Option<usize>,
    assure: usize,
) -> Result<&'a [u64], ErreurDevin> {
    if donnees.len() < minimum + assure {
        return Err(ErreurDevin::DonneesInsuffisantes {
            requis: minimum + assure,
            recu: donnees.len(),
        });
    }
    match coupe {
        Some(c) if donnees.len() > minimum + c => Ok(&donnees[..minimum + c]),
        _ => Ok(donnees),
    }
}

/* ------------------------ cas décalage / q / différentiel ------------------------ */

/// Base des opérateurs de GF(p)[x]⟨X⟩ d'ordre ≤ `ordre` et de degré
/// ≤ `degre` qui annulent `donnees` (comme suite pour S et Q, comme
/// série pour D). Ordre ou degré négatif : base vide.
#[allow(clippy::too_many_arguments)]
pub fn devine_brut(
    donnees: &[u64],
    p: u64,
    genre: Generateur,
    q: u64,
    ordre: isize,
    degre: isize,
    coupe: Option<usize>,
    assure: usize,
    resolveur: Option<Resolveur>,
) -> Result<Vec<OperateurZp>, ErreurDevin> {
    if ordre < 0 || degre < 0 {
        return Ok(Vec::new());
    }
    let (ordre, degre) = (ordre as usize, degre as usize);
    let donnees = fenetre(donnees, longueur_minimale(ordre, degre), coupe, assure)?;

    debug!(
        longueur = donnees.len(),
        ordre, degre, p, "devinette brute"
    );

    // colonnes du système, indexées j·(degre+1) + i
    let colonnes = match genre {
        Generateur::Derivee => colonnes_derivee(donnees, p, ordre, degre),
        _ => colonnes_decalage(donnees, p, genre, q, ordre, degre),
    };

    let tronc = colonnes.iter().map(Vec::len).min().unwrap_or(0);
    let lignes: Vec<Vec<u64>> = (0..tronc)
        .map(|n| colonnes.iter().map(|c| c[n]).collect())
        .collect();

    let noyau = resolveur.unwrap_or(noyau_droit)(lignes, p);
    debug!(dimension = noyau.len(), "noyau calculé");

    Ok(noyau
        .into_iter()
        .map(|v| decoupe_solution(&v, p, genre, q, ordre, degre))
        .collect())
}

fn colonnes_decalage(
    donnees: &[u64],
    p: u64,
    genre: Generateur,
    q: u64,
    ordre: usize,
    degre: usize,
) -> Vec<Vec<u64>> {
    // nn[n] = n (décalage) ou qⁿ (q-décalage)
    let nn: Vec<u64> = match genre {
        Generateur::QDecalage => {
            let mut acc = 1u64;
            (0..donnees.len())
                .map(|_| {
                    let v = acc;
                    acc = zp::multiplie(acc, q % p, p);
                    v
                })
                .collect()
        }
        _ => (0..donnees.len() as u64).map(|n| n % p).collect(),
    };

    let mut colonnes = Vec::with_capacity((ordre + 1) * (degre + 1));
    for j in 0..=ordre {
        // colonne (i, j) : ( nn[n+j]^i · a(n+j) )ₙ
        let mut courante: Vec<u64> = donnees[j..].to_vec();
        for _ in 0..=degre {
            colonnes.push(courante.clone());
            for (n, x) in courante.iter_mut().enumerate() {
                *x = zp::multiplie(*x, nn[n + j], p);
            }
        }
    }
    colonnes
}

fn colonnes_derivee(donnees: &[u64], p: u64, ordre: usize, degre: usize) -> Vec<Vec<u64>> {
    // derivees[j] = coefficients de f⁽ʲ⁾ : f⁽ʲ⁺¹⁾[n] = (n+1)·f⁽ʲ⁾[n+1]
    let mut derivees: Vec<Vec<u64>> = vec![donnees.to_vec()];
    for _ in 0..ordre {
        let prec = derivees.last().expect("au moins f");
        let suiv: Vec<u64> = prec[1..]
            .iter()
            .enumerate()
            .map(|(n, &a)| zp::multiplie(a, (n as u64 + 1) % p, p))
            .collect();
        derivees.push(suiv);
    }

    let mut colonnes = Vec::with_capacity((ordre + 1) * (degre + 1));
    for derive in &derivees {
        // colonne (i, j) : xⁱ·f⁽ʲ⁾, i zéros devant
        for i in 0..=degre {
            let mut c = vec![0u64; i];
            c.extend_from_slice(derive);
            colonnes.push(c);
        }
    }
    colonnes
}

/// Redécoupe un vecteur du noyau en coefficients d'opérateur : la
/// tranche j, vue comme polynôme, reçoit σʲ avant de devenir le
/// coefficient de Xʲ.
fn decoupe_solution(
    v: &[u64],
    p: u64,
    genre: Generateur,
    q: u64,
    ordre: usize,
    degre: usize,
) -> OperateurZp {
    let mut coeffs = Vec::with_capacity(ordre + 1);
    for j in 0..=ordre {
        let tranche = &v[j * (degre + 1)..(j + 1) * (degre + 1)];
        let poly = PolyZp::depuis_coeffs(tranche.to_vec(), p);
        let corrige = match genre {
            Generateur::Decalage | Generateur::DifferenceAvant => poly.decale_arg(j as u64),
            Generateur::QDecalage => poly.echelle_arg(zp::puissance(q, j as u64, p)),
            Generateur::Derivee | Generateur::Algebrique => poly,
        };
        coeffs.push(corrige);
    }
    OperateurZp::nouveau(coeffs, p, genre, q).normalise_dominant()
}

/* ------------------------ cas différentiel / algébrique par séries ------------------------ */

/// Base des opérateurs annulant `donnees` vue comme série tronquée :
/// Σⱼ cⱼ(x)·f⁽ʲ⁾ ≡ 0 (générateur D) ou Σⱼ cⱼ(x)·fʲ ≡ 0 (générateur C),
/// modulo une puissance de x dictée par la longueur des données.
pub fn devine_hp(
    donnees: &[u64],
    p: u64,
    genre: Generateur,
    ordre: isize,
    degre: isize,
    coupe: Option<usize>,
    assure: usize,
) -> Result<Vec<OperateurZp>, ErreurDevin> {
    if ordre < 0 || degre < 0 {
        return Ok(Vec::new());
    }
    let (ordre, degre) = (ordre as usize, degre as usize);
    let donnees = fenetre(donnees, longueur_minimale(ordre, degre), coupe, assure)?;

    debug!(
        longueur = donnees.len(),
        ordre, degre, p, "devinette par séries"
    );

    // series[j] = f⁽ʲ⁾ (cas D) ou fʲ (cas C), tronquées au nombre de
    // coefficients encore fiables
    let f = PolyZp::depuis_coeffs(donnees.to_vec(), p);
    let (series, tronc) = match genre {
        Generateur::Derivee => {
            let tronc = donnees.len() - ordre;
            let mut series = vec![f];
            for _ in 0..ordre {
                let d = series.last().expect("au moins f").derivee();
                series.push(d);
            }
            (
                series.into_iter().map(|s| s.tronque(tronc)).collect::<Vec<_>>(),
                tronc,
            )
        }
        _ => {
            let tronc = donnees.len();
            let mut series = vec![PolyZp::un(p)];
            for _ in 0..ordre {
                let s = series.last().expect("au moins 1").multiplie(&f).tronque(tronc);
                series.push(s);
            }
            (series, tronc)
        }
    };

    // contrainte n : coefficient de xⁿ de Σ c_{j,i}·xⁱ·series[j]
    let mut lignes = Vec::with_capacity(tronc);
    for n in 0..tronc {
        let mut ligne = Vec::with_capacity((ordre + 1) * (degre + 1));
        for serie in &series {
            for i in 0..=degre {
                ligne.push(if n >= i { serie.coeff(n - i) } else { 0 });
            }
        }
        lignes.push(ligne);
    }

    let noyau = noyau_droit(lignes, p);
    debug!(dimension = noyau.len(), "noyau calculé");

    Ok(noyau
        .into_iter()
        .map(|v| decoupe_solution(&v, p, genre, 1, ordre, degre))
        .collect())
}

/* ------------------------ tests ------------------------ */

#[cfg(test)]
mod tests {
    use super::*;

    const P: u64 = 1091;

    #[test]
    fn noyau_droit_simple() {
        // x + 2y = 0 sur GF(5) : noyau engendré par (3, 1)
        let base = noyau_droit(vec![vec![1, 2]], 5);
        assert_eq!(base.len(), 1);
        let v = &base[0];
        assert_eq!(zp::ajoute(v[0], zp::multiplie(2, v[1], 5), 5), 0);
    }

    #[test]
    fn noyau_droit_matrice_reguliere() {
        let base = noyau_droit(vec![vec![1, 0], vec![0, 1]], 5);
        assert!(base.is_empty());
    }

    #[test]
    fn suite_geometrique() {
        // 2^n : annulé par S - 2 (ordre 1, degré 0)
        let donnees: Vec<u64> = (0..20).map(|n| zp::puissance(2, n, P)).collect();
        let sols = devine_brut(
            &donnees,
            P,
            Generateur::Decalage,
            1,
            1,
            0,
            Some(25),
            0,
            None,
        )
        .unwrap();
        assert_eq!(sols.len(), 1);
        let op = &sols[0];
        assert_eq!(op.ordre(), 1);
        assert!(op.applique_suite(&donnees).iter().all(|&c| c == 0));
        // normalisation : tête monique
        assert_eq!(op.coeff_dominant().coeff_dominant(), 1);
    }

    #[test]
    fn suite_polynomiale_coefficients_en_n() {
        // a(n) = n : n·a(n+1) − (n+1)·a(n) = 0, ordre 1, degré 1
        let donnees: Vec<u64> = (0..30u64).map(|n| n % P).collect();
        let sols = devine_brut(
            &donnees,
            P,
            Generateur::Decalage,
            1,
            1,
            1,
            Some(25),
            0,
            None,
        )
        .unwrap();
        assert_eq!(sols.len(), 1);
        assert!(sols[0].applique_suite(&donnees).iter().all(|&c| c == 0));
    }

    #[test]
    fn fibonacci_ordre_deux() {
        let mut donnees = vec![0u64, 1];
        for n in 2..25 {
            donnees.push(zp::ajoute(donnees[n - 1], donnees[n - 2], P));
        }
        let sols = devine_brut(
            &donnees,
            P,
            Generateur::Decalage,
            1,
            2,
            0,
            Some(25),
            0,
            None,
        )
        .unwrap();
        assert!(!sols.is_empty());
        for op in &sols {
            assert!(op.applique_suite(&donnees).iter().all(|&c| c == 0));
        }
    }

    #[test]
    fn q_recurrence() {
        // a(n+1) = 3ⁿ·a(n) avec q = 3 : annulé par Q − x
        let q = 3u64;
        let mut donnees = vec![1u64];
        for n in 0..20u64 {
            let f = zp::puissance(q, n, P);
            let dernier = *donnees.last().expect("non vide");
            donnees.push(zp::multiplie(f, dernier, P));
        }
        let sols = devine_brut(
            &donnees,
            P,
            Generateur::QDecalage,
            q,
            1,
            1,
            Some(25),
            0,
            None,
        )
        .unwrap();
        assert!(!sols.is_empty());
        for op in &sols {
            assert!(op.applique_suite(&donnees).iter().all(|&c| c == 0));
        }
    }

    #[test]
    fn equation_differentielle_geometrique() {
        // f = 1/(1−x) : (1−x)·f′ − f = 0
        let donnees = vec![1u64; 20];
        let sols = devine_brut(
            &donnees,
            P,
            Generateur::Derivee,
            1,
            1,
            1,
            Some(25),
            0,
            None,
        )
        .unwrap();
        assert!(!sols.is_empty());
        for op in &sols {
            let image = op.applique_serie(&donnees);
            assert!(image.est_nul(), "image non nulle : {image}");
        }
    }

    #[test]
    fn equation_algebrique() {
        // f = x/(1−x) = x + x² + … : (1−x)·f − x = 0, ordre 1, degré 1
        let mut donnees = vec![0u64];
        donnees.extend(std::iter::repeat(1).take(19));
        let sols = devine_hp(&donnees, P, Generateur::Algebrique, 1, 1, Some(25), 0).unwrap();
        assert!(!sols.is_empty());
        for op in &sols {
            let image = op.applique_serie(&donnees);
            assert!(image.est_nul(), "image non nulle : {image}");
        }
    }

    #[test]
    fn series_et_matrice_concordent_pour_derivee() {
        // même problème différentiel par les deux chemins : les deux
        // trouvent au moins un annulateur
        let donnees: Vec<u64> = (0..24).map(|n| zp::puissance(2, n, P)).collect();
        let par_matrice = devine_brut(
            &donnees,
            P,
            Generateur::Derivee,
            1,
            1,
            1,
            Some(25),
            0,
            None,
        )
        .unwrap();
        let par_series = devine_hp(&donnees, P, Generateur::Derivee, 1, 1, Some(25), 0).unwrap();
        assert!(!par_matrice.is_empty());
        assert!(!par_series.is_empty());
    }

    #[test]
    fn pas_assez_de_termes() {
        let donnees = vec![1u64, 2, 4, 8];
        let err = devine_brut(
            &donnees,
            P,
            Generateur::Decalage,
            1,
            2,
            2,
            Some(25),
            0,
            None,
        );
        assert!(matches!(
            err,
            Err(ErreurDevin::DonneesInsuffisantes { requis: 12, recu: 4 })
        ));
    }

    #[test]
    fn bornes_negatives_base_vide() {
        let donnees = vec![1u64, 1, 1];
        let sols = devine_brut(
            &donnees,
            P,
            Generateur::Decalage,
            1,
            -1,
            3,
            None,
            0,
            None,
        )
        .unwrap();
        assert!(sols.is_empty());
    }
}
