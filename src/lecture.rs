// src/lecture.rs
//
// Décodage d'une suite donnée en texte : une valeur par ligne, lignes
// vides ignorées. Le format accepté dépend du domaine :
// - ZZ      : entiers (signe permis)
// - QQ      : entiers ou fractions a/b
// - GF(p)   : résidus, réduits modulo p (signe permis)
//
// Les domaines polynomiaux n'ont pas de format texte.

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::Zero;

use crate::algebre::Domaine;
use crate::erreur::ErreurDevin;
use crate::scalaire::{residu_mod, Scalaire};

/// Décode `texte` en une suite de termes du domaine donné.
pub fn lit_suite(texte: &str, domaine: &Domaine) -> Result<Vec<Scalaire>, ErreurDevin> {
    let mut suite = Vec::new();
    for (i, ligne) in texte.lines().enumerate() {
        let brut = ligne.trim();
        if brut.is_empty() {
            continue;
        }
        suite.push(lit_terme(brut, domaine).map_err(|raison| {
            ErreurDevin::TermeIllegal(format!("ligne {} : {raison}", i + 1))
        })?);
    }
    Ok(suite)
}

fn lit_terme(brut: &str, domaine: &Domaine) -> Result<Scalaire, String> {
    match domaine {
        Domaine::Entiers => Ok(Scalaire::Entier(lit_entier(brut)?)),
        Domaine::Rationnels => match brut.split_once('/') {
            Some((num, den)) => {
                let den = lit_entier(den.trim())?;
                if den.is_zero() {
                    return Err(format!("dénominateur nul dans « {brut} »"));
                }
                Ok(Scalaire::Rationnel(BigRational::new(
                    lit_entier(num.trim())?,
                    den,
                )))
            }
            None => Ok(Scalaire::Rationnel(BigRational::from_integer(lit_entier(
                brut,
            )?))),
        },
        Domaine::CorpsPremier(p) => {
            let n = lit_entier(brut)?;
            Ok(Scalaire::Mod(residu_mod(&n, *p), *p))
        }
        autre => Err(format!("pas de format texte pour {}", autre.nom())),
    }
}

fn lit_entier(brut: &str) -> Result<BigInt, String> {
    brut.parse::<BigInt>()
        .map_err(|_| format!("entier illisible : « {brut} »"))
}

/* ------------------------ tests ------------------------ */
