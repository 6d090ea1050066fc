// src/chemin.rs
//
// Planification du chemin de recherche : quelle suite de couples
// (ordre, degré) sonder, sachant que N termes ne permettent de tester
// (r, d) que si N ≥ (r+1)·(d+2).
//
// Le chemin par défaut longe l'hyperbole r2d(r) = (N − 2r − 2)/(r + 1),
// précédé d'un prélude fibonaccien de petits couples (1,1), (1,2),
// (2,3), (3,5), … qui attrape vite les relations simples. Les points
// dominés (couverts par un point au moins aussi grand dans les deux
// coordonnées) sont élagués, prélude excepté.

use tracing::debug;

/// Bornes de recherche imposées par l'appelant. Les caps absents
/// valent la longueur des données.
#[derive(Clone, Debug)]
pub struct Bornes {
    pub min_ordre: usize,
    pub max_ordre: Option<usize>,
    pub min_degre: usize,
    pub max_degre: Option<usize>,
}

impl Default for Bornes {
    fn default() -> Self {
        Self {
            min_ordre: 1,
            max_ordre: None,
            min_degre: 0,
            max_degre: None,
        }
    }
}

/// Degré maximal testable à l'ordre r avec n termes (division entière,
/// plancher vers −∞).
pub fn degre_pour_ordre(n: usize, r: usize) -> isize {
    let num = n as isize - 2 * r as isize - 2;
    num.div_euclid(r as isize + 1)
}

/// Construit le chemin de sondage pour `longueur` termes. Si l'appelant
/// fournit son propre chemin, il est seulement trié et élagué.
pub fn planifie(
    longueur: usize,
    chemin: Option<&[(usize, usize)]>,
    bornes: &Bornes,
) -> Vec<(usize, usize)> {
    let n = longueur;
    let (mut points, prelude_long, cle): (Vec<(usize, usize)>, usize, fn(&(usize, usize)) -> usize) =
        match chemin {
            Some(fourni) => (fourni.to_vec(), 0, |p| (p.0 + 1) * (p.1 + 1)),
            None => {
                let mut prelude = Vec::new();
                let (mut r, mut d) = (1usize, 1usize);
                while (d as isize) <= degre_pour_ordre(n, r) {
                    prelude.push((r, d));
                    let suivant = r + d;
                    r = d;
                    d = suivant;
                }
                let prelude_long = prelude.len();

                let mut points = prelude;
                for r in 1..n {
                    let d = degre_pour_ordre(n, r);
                    if d >= 0 {
                        points.push((r, d as usize));
                    }
                }
                // légère préférence pour les petits ordres
                (points, prelude_long, |p| 2 * p.0 + (p.0 + 1) * (p.1 + 1))
            }
        };

    let max_ordre = bornes.max_ordre.unwrap_or(n);
    let max_degre = bornes.max_degre.unwrap_or(n);
    points.retain(|&(r, d)| {
        bornes.min_ordre <= r && r <= max_ordre && bornes.min_degre <= d && d <= max_degre
    });

    points.sort_by_key(|p| cle(p));

    // élagage des points dominés ; le prélude (les prelude_long
    // premiers après tri) est exempté de suppression
    let mut garde: Vec<Option<(usize, usize)>> = points.iter().copied().map(Some).collect();
    for i in prelude_long.min(garde.len())..garde.len() {
        let Some((r, d)) = garde[i] else { continue };
        let domine = garde
            .iter()
            .enumerate()
            .any(|(j, pj)| j != i && matches!(pj, Some((rj, dj)) if *rj >= r && *dj >= d));
        if domine {
            garde[i] = None;
        }
    }
    let sortie: Vec<(usize, usize)> = garde.into_iter().flatten().collect();
    debug!(points = sortie.len(), longueur, "chemin planifié");
    sortie
}

/// Raffinement du chemin après une première image : connaissant le
/// format (r0, d0) réellement trouvé et le point (r1, d1) où il l'a
/// été, place des points intermédiaires sur l'hyperbole passant par
/// les deux, du côté des petits ordres. None si la géométrie dégénère
/// ou si le gain est trop mince pour valoir un préfixe.
pub fn raffine(r0: usize, d0: usize, r1: usize, d1: usize) -> Option<Vec<(usize, usize)>> {
    let (r0f, d0f, r1f, d1f) = (r0 as f64, d0 as f64, r1 as f64, d1 as f64);

    let denom = d0f + r0f + d1f * (r0f - 1.0 - r1f) - r1f;
    if denom == 0.0 {
        return None;
    }
    let r2f = r0f - 1.0 + ((d0f - d1f) * r0f * (r0f - 1.0 - r1f) / denom).abs().sqrt();
    if !r2f.is_finite() {
        return None;
    }
    let denom2 = (r0f - r1f) * (r0f - 1.0 - r2f);
    if denom2 == 0.0 {
        return None;
    }
    let d2f = (d1f * (r0f - 1.0 - r1f) * (r0f - r2f) + d0f * (r1f - r2f)) / denom2;
    if !d2f.is_finite() {
        return None;
    }

    let r2 = r2f.ceil() as i64;
    let d2 = d2f.ceil() as i64;
    let (r1, d1) = (r1 as i64, d1 as i64);

    if (r2 - r1).abs() < 2 || (d2 - d1).abs() < 2 {
        return None;
    }

    let pas = if r1 > r2 { 1i64 } else { -1i64 };
    let mut prefixe = Vec::new();
    let mut i = r2;
    while i != r1 {
        let d = d2 + ((d1 - d2) * (i - r2)).div_euclid(r1 - r2);
        if i >= 0 && d >= 0 {
            prefixe.push((i as usize, d as usize));
        }
        i += pas;
    }
    debug!(?prefixe, "chemin raffiné");
    Some(prefixe)
}

/* ------------------------ tests ------------------------ */
