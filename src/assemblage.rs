// src/assemblage.rs
//
// Recherche sur GF(p) : parcours du chemin (ordre, degré), sondages
// bruts, descente en degré, et pgcd à droite des deux premières
// relations indépendantes trouvées.
//
// Le pgcd des deux premières solutions élimine les facteurs parasites
// que chaque sondage isolé peut contenir : deux solutions de formats
// différents ne partagent que l'opérateur minimal.

use tracing::{debug, info};

use crate::algebre::Generateur;
use crate::brut::{devine_brut, devine_hp, Resolveur};
use crate::chemin::{planifie, Bornes};
use crate::erreur::ErreurDevin;
use crate::operateur::OperateurZp;

/// Réglages d'une recherche sur GF(p).
#[derive(Clone, Default)]
pub struct Sondage {
    pub bornes: Bornes,
    /// Chemin imposé par l'appelant ; sinon le chemin par défaut.
    pub chemin: Option<Vec<(usize, usize)>>,
    pub coupe: Option<usize>,
    pub assure: usize,
    pub resolveur: Option<Resolveur>,
    /// Si vrai, descend en degré à chaque point fécond pour cerner le
    /// format minimal (utile à l'orchestrateur pour raffiner le chemin).
    pub chemin_court: bool,
}

/// Cherche un opérateur de GF(p)[x]⟨X⟩ annulant `donnees`. Renvoie
/// l'opérateur et le chemin court : les couples (ordre, degré) où des
/// solutions ont effectivement été trouvées.
pub fn devine_par_pgcd(
    donnees: &[u64],
    p: u64,
    genre: Generateur,
    q: u64,
    sondage: &Sondage,
) -> Result<(OperateurZp, Vec<(usize, usize)>), ErreurDevin> {
    let n = donnees.len().saturating_sub(sondage.assure);
    let chemin = planifie(n, sondage.chemin.as_deref(), &sondage.bornes);
    info!(
        longueur = donnees.len(),
        points = chemin.len(),
        p,
        "recherche sur GF(p)"
    );

    // mémo des sondages stériles ; un sondage plus petit dans les deux
    // coordonnées qu'un stérile connu est stérile aussi
    let mut steriles: Vec<(isize, isize)> = Vec::new();
    let mut sonde = |r: isize, d: isize| -> Result<Vec<OperateurZp>, ErreurDevin> {
        if steriles.iter().any(|&(rs, ds)| r <= rs && d <= ds) {
            return Ok(Vec::new());
        }
        let sols = match genre {
            Generateur::Algebrique => {
                devine_hp(donnees, p, genre, r, d, sondage.coupe, sondage.assure)?
            }
            _ => devine_brut(
                donnees,
                p,
                genre,
                q,
                r,
                d,
                sondage.coupe,
                sondage.assure,
                sondage.resolveur,
            )?,
        };
        debug!(r, d, solutions = sols.len(), "sondage");
        if sols.is_empty() {
            steriles.push((r, d));
        }
        Ok(sols)
    };

    let mut trouvees: Vec<OperateurZp> = Vec::new();
    let mut chemin_court: Vec<(usize, usize)> = Vec::new();

    for &(r, d_point) in &chemin {
        let r = r as isize;
        let mut d = d_point as isize;
        // les formats déjà féconds rendent inutile tout point dominé
        for &(r1, d1) in &chemin_court {
            if r >= r1 as isize {
                d = d.min(d1 as isize - 1);
            }
        }
        if d < 0 {
            continue;
        }

        let mut sols = sonde(r, d)?;

        // descente : cerne le degré minimal au même ordre
        while sondage.chemin_court && d > 0 && sols.len() > 1 {
            let nouvelles = sonde(r, d - 1)?;
            if nouvelles.is_empty() {
                break;
            }
            // signé : une fenêtre plus courte a moins de contraintes, le
            // noyau peut grossir en descendant
            let m = sols.len() as isize - nouvelles.len() as isize;
            if m <= 0 {
                // le sondage renvoie des degrés minimaux : lire la réponse
                d = sols.iter().map(|l| l.degre()).max().unwrap_or(d);
                break;
            }
            let d2 = ((d as f64) - (sols.len() as f64) / (m as f64)).ceil().max(0.0) as isize;
            sols = if d2 < d - 1 { sonde(r, d2)? } else { nouvelles };
            d = d2;
            if sols.is_empty() {
                // descente trop gourmande : remonte au premier degré fécond
                while sols.is_empty() {
                    d += 1;
                    sols = sonde(r, d)?;
                }
                break;
            }
        }

        if !sols.is_empty() {
            chemin_court.push((r as usize, d.max(0) as usize));
            trouvees.extend(sols);
        }
        if trouvees.len() >= 2 {
            break;
        }
    }

    let operateur = match trouvees.len() {
        0 => return Err(ErreurDevin::AucuneRelation),
        1 => trouvees.swap_remove(0).normalise_dominant(),
        _ => trouvees[0].pgcd_droit(&trouvees[1]),
    };
    info!(
        ordre = operateur.ordre(),
        degre = operateur.degre(),
        "relation trouvée"
    );
    Ok((operateur, chemin_court))
}

/* ------------------------ tests ------------------------ */
