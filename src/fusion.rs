// src/fusion.rs
//
// Fusion d'images homomorphes : restes chinois (modules entiers) ou
// interpolation de Lagrange (modules t − e), coefficient par coefficient,
// suivie d'une tentative de reconstruction rationnelle.
//
// Le module courant est une machine à états :
//   Rien ──première image──▶ Entier/Poly ──reconstruction réussie──▶ Clos
//
// Une fois Clos, les fusions suivantes sont des passe-plats : l'appelant
// confirme le résultat par d'autres moyens (nouvelle image, comparaison).

use num_bigint::BigInt;
use num_traits::Zero;

use crate::erreur::ErreurDevin;
use crate::operateur::Operateur;
use crate::polyzp::PolyZp;
use crate::reconstruction::{recon_entier, recon_poly};
use crate::scalaire::{mod_euclid, pgcd_etendu, PolyZ, Scalaire};

/* ------------------------ module courant ------------------------ */

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Module {
    /// Aucune image encore fusionnée.
    Rien,
    /// Produit des premiers déjà fusionnés.
    Entier(BigInt),
    /// Produit des t − e déjà fusionnés.
    Poly(PolyZp),
    /// Reconstruction réussie : le candidat est définitif.
    Clos,
}

impl Module {
    pub fn est_clos(&self) -> bool {
        matches!(self, Module::Clos)
    }

    pub fn est_rien(&self) -> bool {
        matches!(self, Module::Rien)
    }
}

/* ------------------------ fusion ------------------------ */

/// Fusionne l'image `lp` (de module `prochain`) dans le candidat `l`
/// (de module `module`). Renvoie le nouveau couple (candidat, module).
///
/// Erreur dure si les formats (ordre, degré) ne concordent pas : deux
/// premiers chanceux ne donnent jamais des formats différents pour le
/// même problème, donc l'un des deux est malchanceux et l'appelant doit
/// arbitrer.
pub fn fusionne(
    l: &Operateur,
    module: &Module,
    lp: &Operateur,
    prochain: &Module,
    reconstruire: bool,
) -> Result<(Operateur, Module), ErreurDevin> {
    if module.est_clos() {
        return Ok((l.clone(), Module::Clos));
    }

    let (grille, nouveau) = if module.est_rien() || l.est_nul() {
        (releve(lp, prochain)?, prochain.clone())
    } else {
        if (l.ordre(), l.degre()) != (lp.ordre(), lp.degre()) {
            return Err(ErreurDevin::ImagesIncompatibles {
                ordre_a: l.ordre(),
                degre_a: l.degre(),
                ordre_b: lp.ordre(),
                degre_b: lp.degre(),
            });
        }
        match (module, prochain) {
            (Module::Entier(m), Module::Entier(p)) => {
                (combine_entier(l, lp, m, p)?, Module::Entier(m * p))
            }
            (Module::Poly(m), Module::Poly(pt)) => {
                (combine_poly(l, lp, m, pt)?, Module::Poly(m.multiplie(pt)))
            }
            _ => {
                return Err(ErreurDevin::DomaineInattendu(
                    "modules de natures différentes".into(),
                ))
            }
        }
    };

    let genre = if l.est_nul() { lp.genre() } else { l.genre() };

    if !reconstruire {
        return Ok((Operateur::depuis_grille(grille, genre), nouveau));
    }

    match tente_reconstruction(&grille, &nouveau)? {
        Some(reconstruit) => Ok((Operateur::depuis_grille(reconstruit, genre), Module::Clos)),
        None => Ok((Operateur::depuis_grille(grille, genre), nouveau)),
    }
}

/// Relève les résidus d'une image fraîche vers l'anneau du module.
fn releve(lp: &Operateur, prochain: &Module) -> Result<Vec<Vec<Scalaire>>, ErreurDevin> {
    let mut grille = Vec::with_capacity(lp.grille().len());
    for ligne in lp.grille() {
        let mut nl = Vec::with_capacity(ligne.len());
        for s in ligne {
            let releve = match (s, prochain) {
                (Scalaire::Mod(v, _), Module::Entier(_)) => {
                    Scalaire::Entier(BigInt::from(*v))
                }
                (Scalaire::PolyMod(q), Module::Entier(_)) => Scalaire::PolyEntier(
                    PolyZ::depuis_coeffs(q.coeffs().iter().map(|&c| BigInt::from(c)).collect()),
                ),
                (Scalaire::Mod(v, p), Module::Poly(_)) => {
                    Scalaire::PolyMod(PolyZp::constante(*v, *p))
                }
                (Scalaire::PolyMod(q), Module::Poly(_)) => Scalaire::PolyMod(q.clone()),
                (Scalaire::Entier(c), Module::Entier(_)) => Scalaire::Entier(c.clone()),
                (Scalaire::PolyEntier(q), Module::Entier(_)) => Scalaire::PolyEntier(q.clone()),
                (autre, _) => {
                    return Err(ErreurDevin::TermeIllegal(format!(
                        "image dans un domaine inattendu : {}",
                        autre.nom_domaine()
                    )))
                }
            };
            nl.push(releve);
        }
        grille.push(nl);
    }
    Ok(grille)
}

/// Restes chinois entiers : c ≡ cL (mod m), c ≡ cLp (mod p), c ∈ [0, m·p).
fn combine_entier(
    l: &Operateur,
    lp: &Operateur,
    m: &BigInt,
    p: &BigInt,
) -> Result<Vec<Vec<Scalaire>>, ErreurDevin> {
    let (_, s, t) = pgcd_etendu(p, m);
    let mod0 = &s * p; // ≡ 1 mod m, ≡ 0 mod p
    let p0 = &t * m; // ≡ 0 mod m, ≡ 1 mod p
    let nm = m * p;

    let cra = |a: &BigInt, b: &BigInt| mod_euclid(&(&mod0 * a + &p0 * b), &nm);

    let mut grille = Vec::with_capacity(l.grille().len());
    for (i, ligne) in l.grille().iter().enumerate() {
        let vide = Vec::new();
        let ligne_p = lp.grille().get(i).unwrap_or(&vide);
        let largeur = ligne.len().max(ligne_p.len());
        let mut nl = Vec::with_capacity(largeur);
        for j in 0..largeur {
            let cl = ligne.get(j);
            let clp = ligne_p.get(j);
            let en_t = matches!(cl, Some(Scalaire::PolyEntier(_)))
                || matches!(clp, Some(Scalaire::PolyMod(_)));
            let combine = if en_t {
                // coefficients polynomiaux en t : CRT coefficient par coefficient
                let a = match cl {
                    None => PolyZ::nul(),
                    Some(Scalaire::PolyEntier(q)) => q.clone(),
                    Some(Scalaire::Entier(c)) => PolyZ::constante(c.clone()),
                    Some(autre) => return Err(coefficient_inattendu(autre)),
                };
                let b = match clp {
                    None => PolyZ::nul(),
                    Some(Scalaire::PolyMod(q)) => PolyZ::depuis_coeffs(
                        q.coeffs().iter().map(|&c| BigInt::from(c)).collect(),
                    ),
                    Some(Scalaire::Mod(v, _)) => PolyZ::constante(BigInt::from(*v)),
                    Some(Scalaire::PolyEntier(q)) => q.clone(),
                    Some(Scalaire::Entier(c)) => PolyZ::constante(c.clone()),
                    Some(autre) => return Err(coefficient_inattendu(autre)),
                };
                let largeur_t = a.coeffs().len().max(b.coeffs().len());
                let coeffs = (0..largeur_t)
                    .map(|k| cra(&a.coeff(k), &b.coeff(k)))
                    .collect();
                Scalaire::PolyEntier(PolyZ::depuis_coeffs(coeffs))
            } else {
                // coefficients atomiques : ZZ ← CRT(ZZ, GF(p))
                let a = match cl {
                    None => BigInt::zero(),
                    Some(Scalaire::Entier(c)) => c.clone(),
                    Some(autre) => return Err(coefficient_inattendu(autre)),
                };
                let b = match clp {
                    None => BigInt::zero(),
                    Some(Scalaire::Mod(v, _)) => BigInt::from(*v),
                    Some(Scalaire::Entier(c)) => c.clone(),
                    Some(autre) => return Err(coefficient_inattendu(autre)),
                };
                Scalaire::Entier(cra(&a, &b))
            };
            nl.push(combine);
        }
        grille.push(nl);
    }
    Ok(grille)
}

fn coefficient_inattendu(s: &Scalaire) -> ErreurDevin {
    ErreurDevin::TermeIllegal(format!(
        "fusion sur un coefficient inattendu : {}",
        s.nom_domaine()
    ))
}

/// Interpolation : c ≡ cL (mod m), c ≡ cLp (mod t − e) dans GF(p)[t].
fn combine_poly(
    l: &Operateur,
    lp: &Operateur,
    m: &PolyZp,
    pt: &PolyZp,
) -> Result<Vec<Vec<Scalaire>>, ErreurDevin> {
    let prem = m.premier();
    let (_, s, t) = pt.pgcd_etendu(m);
    let mod0 = s.multiplie(pt);
    let p0 = t.multiplie(m);
    let nm = m.multiplie(pt);

    let zero = PolyZp::nul(prem);
    let extrait = |s: Option<&Scalaire>| -> Result<PolyZp, ErreurDevin> {
        match s {
            None => Ok(zero.clone()),
            Some(Scalaire::PolyMod(q)) => Ok(q.clone()),
            Some(Scalaire::Mod(v, p)) => Ok(PolyZp::constante(*v, *p)),
            Some(autre) => Err(ErreurDevin::TermeIllegal(format!(
                "fusion polynomiale sur un coefficient inattendu : {}",
                autre.nom_domaine()
            ))),
        }
    };

    let mut grille = Vec::with_capacity(l.grille().len());
    for (i, ligne) in l.grille().iter().enumerate() {
        let vide = Vec::new();
        let ligne_p = lp.grille().get(i).unwrap_or(&vide);
        let largeur = ligne.len().max(ligne_p.len());
        let mut nl = Vec::with_capacity(largeur);
        for j in 0..largeur {
            let a = extrait(ligne.get(j))?;
            let b = extrait(ligne_p.get(j))?;
            let c = mod0.multiplie(&a).ajoute(&p0.multiplie(&b)).reste(&nm);
            nl.push(Scalaire::PolyMod(c));
        }
        grille.push(nl);
    }
    Ok(grille)
}

/* ------------------------ reconstruction ------------------------ */

/// Tente la reconstruction rationnelle de toute la grille. Renvoie
/// Some(grille définitive) si chaque coefficient passe la marge, None
/// sinon (il faut d'autres images). Le dénominateur commun d est
/// accumulé du coefficient de tête vers le bas, puis chassé.
fn tente_reconstruction(
    grille: &[Vec<Scalaire>],
    module: &Module,
) -> Result<Option<Vec<Vec<Scalaire>>>, ErreurDevin> {
    match module {
        Module::Entier(m) => Ok(tente_recon_entier(grille, m)),
        Module::Poly(m) => {
            // au moins 6 points d'évaluation avant de tenter quoi que ce soit
            if m.degre() <= 5 {
                Ok(None)
            } else {
                Ok(tente_recon_poly(grille, m))
            }
        }
        _ => Ok(None),
    }
}

fn tente_recon_entier(grille: &[Vec<Scalaire>], m: &BigInt) -> Option<Vec<Vec<Scalaire>>> {
    let mod2 = m / BigInt::from(2);
    let symetrique = |c: &BigInt| mod_euclid(&(c + &mod2), m) - &mod2;

    // dénominateur commun, accumulé de la tête vers la queue
    let mut d = BigInt::from(1);
    for ligne in grille.iter().rev() {
        for s in ligne.iter().rev() {
            match s {
                Scalaire::Entier(c) => {
                    let (_, q) = recon_entier(&(&d * c), m, None).ok()?;
                    d *= q;
                }
                Scalaire::PolyEntier(a) => {
                    for c in a.coeffs().iter().rev() {
                        let (_, q) = recon_entier(&(&d * c), m, None).ok()?;
                        d *= q;
                    }
                }
                _ => return None,
            }
        }
    }

    // d chasse tous les dénominateurs : les numérateurs sont les
    // représentants symétriques
    let mut sortie = Vec::with_capacity(grille.len());
    for ligne in grille {
        let mut nl = Vec::with_capacity(ligne.len());
        for s in ligne {
            nl.push(match s {
                Scalaire::Entier(c) => Scalaire::Entier(symetrique(&(&d * c))),
                Scalaire::PolyEntier(a) => Scalaire::PolyEntier(PolyZ::depuis_coeffs(
                    a.coeffs().iter().map(|c| symetrique(&(&d * c))).collect(),
                )),
                _ => return None,
            });
        }
        sortie.push(nl);
    }
    Some(sortie)
}

fn tente_recon_poly(grille: &[Vec<Scalaire>], m: &PolyZp) -> Option<Vec<Vec<Scalaire>>> {
    let mut d = PolyZp::un(m.premier());
    for ligne in grille.iter().rev() {
        for s in ligne.iter().rev() {
            match s {
                Scalaire::PolyMod(c) => {
                    let (_, q) = recon_poly(&d.multiplie(c), m, None).ok()?;
                    d = d.multiplie(&q);
                }
                _ => return None,
            }
        }
    }

    let mut sortie = Vec::with_capacity(grille.len());
    for ligne in grille {
        let mut nl = Vec::with_capacity(ligne.len());
        for s in ligne {
            nl.push(match s {
                Scalaire::PolyMod(c) => Scalaire::PolyMod(d.multiplie(c).reste(m)),
                _ => return None,
            });
        }
        sortie.push(nl);
    }
    Some(sortie)
}

/* ------------------------ tests ------------------------ */

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algebre::Generateur;
    use crate::scalaire::residu_mod;

    fn image_mod(coeffs: &[&[i64]], p: u64) -> Operateur {
        let grille = coeffs
            .iter()
            .map(|ligne| {
                ligne
                    .iter()
                    .map(|&c| Scalaire::Mod(residu_mod(&BigInt::from(c), p), p))
                    .collect()
            })
            .collect();
        Operateur::depuis_grille(grille, Generateur::Decalage)
    }

    #[test]
    fn premiere_image_petits_coefficients_se_ferme() {
        // des entiers minuscules face à un premier de 23 bits : la marge
        // |p·q| < m/10000 est immense, la reconstruction réussit d'emblée
        let p = 8388593u64;
        let lp = image_mod(&[&[-2], &[1]], p);
        let (l, m) = fusionne(
            &Operateur::nul(Generateur::Decalage),
            &Module::Rien,
            &lp,
            &Module::Entier(BigInt::from(p)),
            true,
        )
        .unwrap();
        assert!(m.est_clos());
        assert_eq!(l.coeff(0, 0), Some(&Scalaire::entier(-2)));
        assert_eq!(l.coeff(1, 0), Some(&Scalaire::entier(1)));
    }

    #[test]
    fn cra_sur_deux_premiers() {
        // coefficient 1234567 : trop grand pour un seul petit premier,
        // retrouvé après restes chinois sur deux
        let p1 = 1009u64;
        let p2 = 1013u64;
        let vrai = 1234567i64;
        let l1 = image_mod(&[&[vrai], &[1]], p1);
        let l2 = image_mod(&[&[vrai], &[1]], p2);

        let (l, m) = fusionne(
            &Operateur::nul(Generateur::Decalage),
            &Module::Rien,
            &l1,
            &Module::Entier(BigInt::from(p1)),
            false,
        )
        .unwrap();
        let (l, m) = fusionne(&l, &m, &l2, &Module::Entier(BigInt::from(p2)), false).unwrap();
        assert_eq!(m, Module::Entier(BigInt::from(p1) * BigInt::from(p2)));
        match l.coeff(0, 0) {
            Some(Scalaire::Entier(c)) => assert_eq!(c, &BigInt::from(vrai)),
            autre => panic!("attendu Entier, reçu {autre:?}"),
        }
    }

    #[test]
    fn denominateur_commun_chasse() {
        // coefficient 1/3 : la reconstruction trouve q = 3 et renvoie
        // l'opérateur aux numérateurs entiers (1, 3)
        let p = 8388593u64;
        let tiers = zp_tiers(p);
        let lp = Operateur::depuis_grille(
            vec![
                vec![Scalaire::Mod(tiers, p)],
                vec![Scalaire::Mod(1, p)],
            ],
            Generateur::Decalage,
        );
        let (l, m) = fusionne(
            &Operateur::nul(Generateur::Decalage),
            &Module::Rien,
            &lp,
            &Module::Entier(BigInt::from(p)),
            true,
        )
        .unwrap();
        assert!(m.est_clos());
        // la tête (coefficient 1) est parcourue d'abord, puis le terme
        // constant révèle d = 3 : les numérateurs finaux sont (1, 3)
        assert_eq!(l.coeff(0, 0), Some(&Scalaire::entier(1)));
        assert_eq!(l.coeff(1, 0), Some(&Scalaire::entier(3)));
    }

    fn zp_tiers(p: u64) -> u64 {
        crate::zp::multiplie(1, crate::zp::inverse(3, p).unwrap(), p)
    }

    #[test]
    fn formats_discordants_erreur_dure() {
        let p1 = 1009u64;
        let p2 = 1013u64;
        let l1 = image_mod(&[&[1], &[1]], p1); // ordre 1
        let l2 = image_mod(&[&[1], &[1], &[1]], p2); // ordre 2

        let (l, m) = fusionne(
            &Operateur::nul(Generateur::Decalage),
            &Module::Rien,
            &l1,
            &Module::Entier(BigInt::from(p1)),
            false,
        )
        .unwrap();
        let err = fusionne(&l, &m, &l2, &Module::Entier(BigInt::from(p2)), false);
        assert!(matches!(
            err,
            Err(ErreurDevin::ImagesIncompatibles { .. })
        ));
    }

    #[test]
    fn clos_est_un_passe_plat() {
        let p = 8388593u64;
        let l = image_mod(&[&[-2], &[1]], p);
        let autre = image_mod(&[&[999], &[1]], p);
        let (sortie, m) = fusionne(
            &l,
            &Module::Clos,
            &autre,
            &Module::Entier(BigInt::from(p)),
            true,
        )
        .unwrap();
        assert!(m.est_clos());
        assert_eq!(sortie, l);
    }

    #[test]
    fn interpolation_sur_deux_points() {
        // c(t) avec c(7) = 3, c(8) = 5 : l'interpolé doit repasser par
        // les deux points ; module trop court pour tenter la reconstruction
        let p = 8388593u64;
        let l1 = image_mod(&[&[3], &[1]], p);
        let l2 = image_mod(&[&[5], &[1]], p);

        let (l, m) = fusionne(
            &Operateur::nul(Generateur::Decalage),
            &Module::Rien,
            &l1,
            &Module::Poly(PolyZp::t_moins(7, p)),
            true,
        )
        .unwrap();
        let (l, m) = fusionne(&l, &m, &l2, &Module::Poly(PolyZp::t_moins(8, p)), true).unwrap();

        match &m {
            Module::Poly(q) => assert_eq!(q.degre(), 2),
            autre => panic!("attendu Poly, reçu {autre:?}"),
        }
        match l.coeff(0, 0) {
            Some(Scalaire::PolyMod(c)) => {
                assert_eq!(c.evalue(7), 3);
                assert_eq!(c.evalue(8), 5);
            }
            autre => panic!("attendu PolyMod, reçu {autre:?}"),
        }
    }
}
