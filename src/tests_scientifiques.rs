//! Tests scientifiques (campagne) : invariants + aller-retour + limites contrôlées.
//!
//! But : vérifier les propriétés mathématiques sans faire chauffer la machine.
//! - budget temps global
//! - longueurs de suites bornées
//! - la grande campagne (ordre 6, degré 90) est marquée #[ignore]
//!
//! Notes importantes :
//! - L'aller-retour se vérifie en appliquant l'opérateur deviné à la
//!   suite d'origine : le résultat doit être identiquement nul.
//! - La fusion garde les résidus réduits modulo le module courant, donc
//!   deux groupements des mêmes images donnent exactement le même couple
//!   (candidat, module) : l'associativité se teste par égalité stricte.

use std::time::{Duration, Instant};

use num_bigint::BigInt;

use crate::algebre::{Algebre, Domaine, Generateur};
use crate::assemblage::{devine_par_pgcd, Sondage};
use crate::erreur::ErreurDevin;
use crate::facade::{devine, devine_alg, devine_diff, devine_qrec, devine_rec, Config};
use crate::fusion::{fusionne, Module};
use crate::operateur::Operateur;
use crate::scalaire::Scalaire;
use crate::zp;

const P: u64 = 8388593;

/// Budget global anti-gel.
fn budget(debut: Instant, max: Duration) {
    if debut.elapsed() > max {
        panic!("budget temps dépassé : {max:?}");
    }
}

/// RUST_LOG=debug cargo test -- --nocapture pour suivre une campagne.
fn traces() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn entiers(valeurs: impl IntoIterator<Item = BigInt>) -> Vec<Scalaire> {
    valeurs.into_iter().map(Scalaire::Entier).collect()
}

fn annule(op: &Operateur, donnees: &[Scalaire]) {
    let reste = op.applique_rec(donnees).expect("application");
    assert!(
        reste.iter().all(Scalaire::est_nul),
        "l'opérateur n'annule pas la suite"
    );
}

/* ------------------------ aller-retour par générateur ------------------------ */

#[test]
fn sci_recurrence_catalan() {
    // C(n+1) = (4n+2)/(n+2)·C(n) : ordre 1, degré 1
    let mut valeurs = vec![BigInt::from(1)];
    for n in 0..30u32 {
        let suivant = valeurs.last().expect("non vide") * BigInt::from(4 * n + 2)
            / BigInt::from(n + 2);
        valeurs.push(suivant);
    }
    let donnees = entiers(valeurs);
    let op = devine_rec(&donnees, Domaine::Entiers, &Config::default()).unwrap();
    assert_eq!(op.ordre(), 1);
    assert_eq!(op.degre(), 1);
    annule(&op, &donnees);
}

#[test]
fn sci_differentielle_geometrique() {
    // f = 1/(1−x) : (1−x)·f′ − f = 0, ordre 1, degré 1
    let donnees = entiers((0..30).map(|_| BigInt::from(1)));
    let op = devine_diff(&donnees, Domaine::Entiers, &Config::default()).unwrap();
    assert_eq!(op.genre(), Generateur::Derivee);
    assert_eq!(op.ordre(), 1);
    assert_eq!(op.degre(), 1);
}

#[test]
fn sci_q_recurrence() {
    // a(n) = 2^(n(n−1)/2) : a(n+1) = 2ⁿ·a(n), soit Q − x avec q = 2
    let donnees = entiers((0..25u32).map(|n| {
        BigInt::from(2).pow(n * (n.max(1) - 1) / 2)
    }));
    let op = devine_qrec(
        &donnees,
        Domaine::Entiers,
        Scalaire::entier(2),
        &Config::default(),
    )
    .unwrap();
    assert_eq!(op.genre(), Generateur::QDecalage);
    assert_eq!(op.ordre(), 1);
    assert_eq!(op.degre(), 1);
}

#[test]
fn sci_equation_algebrique_catalan() {
    // f = Σ C(n)·xⁿ vérifie x·f² − f + 1 = 0 : ordre 2, degré 1
    let mut valeurs = vec![BigInt::from(1)];
    for n in 0..24u32 {
        let suivant = valeurs.last().expect("non vide") * BigInt::from(4 * n + 2)
            / BigInt::from(n + 2);
        valeurs.push(suivant);
    }
    let donnees = entiers(valeurs);
    let op = devine_alg(&donnees, Domaine::Entiers, &Config::default()).unwrap();
    assert_eq!(op.ordre(), 2);
    assert_eq!(op.degre(), 1);
}

#[test]
fn sci_puissances_de_deux() {
    // la plus simple des récurrences : a(n+1) = 2·a(n)
    let donnees = entiers((0..30u32).map(|n| BigInt::from(2).pow(n)));
    let op = devine_rec(&donnees, Domaine::Entiers, &Config::default()).unwrap();
    assert_eq!(op.ordre(), 1);
    assert_eq!(op.degre(), 0);
    annule(&op, &donnees);
}

/* ------------------------ associativité de la fusion ------------------------ */

#[test]
fn sci_fusion_associative() {
    // trois images du même opérateur 3·S − 7 : les deux groupements
    // donnent le même candidat réduit et le même module
    let premiers = [1009u64, 1013, 1019];
    let image = |p: u64| -> (Operateur, Module) {
        let inv3 = zp::inverse(3 % p, p).expect("3 inversible");
        // normalisé : S − 7/3 mod p
        let grille = vec![
            vec![Scalaire::Mod(zp::multiplie(p - 7 % p, inv3, p), p)],
            vec![Scalaire::Mod(1, p)],
        ];
        (
            Operateur::depuis_grille(grille, Generateur::Decalage),
            Module::Entier(BigInt::from(p)),
        )
    };

    let (a, ma) = image(premiers[0]);
    let (b, mb) = image(premiers[1]);
    let (c, mc) = image(premiers[2]);

    // ((a ⊕ b) ⊕ c)
    let (ab, mab) = fusionne(&Operateur::nul(Generateur::Decalage), &Module::Rien, &a, &ma, false)
        .and_then(|(l, m)| fusionne(&l, &m, &b, &mb, false))
        .unwrap();
    let (gauche, mg) = fusionne(&ab, &mab, &c, &mc, false).unwrap();

    // (a ⊕ (b ⊕ c)) : b ⊕ c d'abord, puis a par l'autre côté
    let (bc, mbc) = fusionne(&Operateur::nul(Generateur::Decalage), &Module::Rien, &b, &mb, false)
        .and_then(|(l, m)| fusionne(&l, &m, &c, &mc, false))
        .unwrap();
    let (droite, md) = fusionne(
        &Operateur::nul(Generateur::Decalage),
        &Module::Rien,
        &a,
        &ma,
        false,
    )
    .and_then(|(l, m)| fusionne(&l, &m, &bc, &mbc, false))
    .unwrap();

    assert_eq!(mg, md);
    assert_eq!(gauche, droite);
}

#[test]
fn sci_fusion_discordante_fatale() {
    let a = Operateur::depuis_grille(
        vec![vec![Scalaire::Mod(1, 1009)], vec![Scalaire::Mod(1, 1009)]],
        Generateur::Decalage,
    );
    let b = Operateur::depuis_grille(
        vec![
            vec![Scalaire::Mod(1, 1013)],
            vec![Scalaire::Mod(1, 1013)],
            vec![Scalaire::Mod(1, 1013)],
        ],
        Generateur::Decalage,
    );
    let err = fusionne(
        &a,
        &Module::Entier(BigInt::from(1009u64)),
        &b,
        &Module::Entier(BigInt::from(1013u64)),
        true,
    );
    assert!(matches!(
        err,
        Err(ErreurDevin::ImagesIncompatibles { .. })
    ));
}

/* ------------------------ campagne (2n+1)³·(1+2ⁿ+3ⁿ)² ------------------------ */

// six termes exponentiels (ratios 1, 2, 3, 4, 6, 9) sous un cube :
// ordre 6, degré 18
#[test]
fn sci_campagne_cube_sur_gf_p() {
    traces();
    let debut = Instant::now();
    let donnees: Vec<u64> = (0..170u64)
        .map(|n| {
            let base = zp::ajoute(
                1,
                zp::ajoute(zp::puissance(2, n, P), zp::puissance(3, n, P), P),
                P,
            );
            let cube = zp::puissance((2 * n + 1) % P, 3, P);
            zp::multiplie(cube, zp::multiplie(base, base, P), P)
        })
        .collect();
    let sondage = Sondage {
        coupe: Some(25),
        chemin_court: true,
        ..Sondage::default()
    };
    let (op, _) = devine_par_pgcd(&donnees, P, Generateur::Decalage, 1, &sondage).unwrap();
    assert_eq!(op.ordre(), 6);
    assert_eq!(op.degre(), 18);
    assert!(op.applique_suite(&donnees).iter().all(|&c| c == 0));
    budget(debut, Duration::from_secs(60));
}

// la version du domaine d'origine : (2n+1)¹⁵·(1+2ⁿ+3ⁿ)², ordre 6,
// degré 90, sur ZZ — longue, lancée explicitement
#[test]
#[ignore]
fn sci_campagne_longue_ordre_6_degre_90() {
    traces();
    let debut = Instant::now();
    let donnees = entiers((0..1000u32).map(|n| {
        let base = BigInt::from(1) + BigInt::from(2).pow(n) + BigInt::from(3).pow(n);
        BigInt::from(2 * n + 1).pow(15) * (&base * &base)
    }));
    let op = devine_rec(&donnees, Domaine::Entiers, &Config::default()).unwrap();
    assert_eq!(op.ordre(), 6);
    assert_eq!(op.degre(), 90);
    annule(&op, &donnees);
    budget(debut, Duration::from_secs(1800));
}

/* ------------------------ monotonie de l'élagage ------------------------ */

#[test]
fn sci_elagage_monotone() {
    // tout point du chemin élagué reste dans le budget de longueur, et
    // aucun point n'est rendu inutile par un autre
    use crate::chemin::{planifie, Bornes};
    for n in [20usize, 50, 100, 200] {
        let chemin = planifie(n, None, &Bornes::default());
        assert!(!chemin.is_empty(), "chemin vide pour n = {n}");
        for &(r, d) in &chemin {
            assert!((r + 1) * (d + 2) <= n, "({r}, {d}) hors budget pour n = {n}");
        }
    }
    // raffiner puis replanifier n'introduit pas de point dominé
    let chemin = planifie(100, Some(&[(3, 3), (5, 9), (4, 9)]), &Bornes::default());
    for (i, &(r, d)) in chemin.iter().enumerate() {
        for (j, &(rj, dj)) in chemin.iter().enumerate() {
            assert!(i == j || !(rj >= r && dj >= d), "({r}, {d}) dominé");
        }
    }
}

/* ------------------------ cohérence GF(p) / ZZ ------------------------ */

#[test]
fn sci_image_coherente_avec_zz() {
    // le même opérateur trouvé sur ZZ puis réduit mod p doit annuler la
    // suite réduite mod p
    let donnees = entiers(
        (0..30u32).map(|n| BigInt::from(n) * BigInt::from(3).pow(n) + BigInt::from(1)),
    );
    let op = devine_rec(&donnees, Domaine::Entiers, &Config::default()).unwrap();
    annule(&op, &donnees);

    let reduites: Vec<Scalaire> = donnees
        .iter()
        .map(|s| s.reduit_mod(P).unwrap())
        .collect();
    let alg = Algebre::decalage(Domaine::CorpsPremier(P));
    let image = devine(&reduites, &alg, &Config::default()).unwrap();
    assert!(image.ordre() <= op.ordre());
}
