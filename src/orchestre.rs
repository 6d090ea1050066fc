// src/orchestre.rs
//
// Orchestration des images homomorphes. Trois campagnes :
//
// 1. ZZ (ou QQ)   → GF(p)    : premiers décroissants, restes chinois.
// 2. GF(p)[t]     → GF(p)    : points t = 7, 8, 9, …, interpolation.
// 3. ZZ[t]        → GF(p)[t] : premiers décroissants, restes chinois
//                              coefficient par coefficient, chaque image
//                              étant elle-même une campagne de type 2.
//
// Déroulement par tours : au tour n on prend max(1, n − 3) modules,
// on devine sur chaque image, on fusionne les images du tour entre
// elles (sans reconstruction), puis dans l'accumulateur (avec
// reconstruction). Le tour 1 capture le chemin court, le tour 2 le
// raffine par l'hyperbole. On s'arrête quand le module se ferme.
//
// Les modules malchanceux (dénominateur divisible par p, q qui
// s'annule) sont écartés et remplacés, dans la limite d'un budget.

use num_bigint::BigInt;
use tracing::{debug, info, warn};

use crate::algebre::{Algebre, Domaine, Generateur};
use crate::assemblage::{devine_par_pgcd, Sondage};
use crate::chemin::raffine;
use crate::erreur::ErreurDevin;
use crate::fusion::{fusionne, Module};
use crate::operateur::{Operateur, OperateurZp};
use crate::polyzp::PolyZp;
use crate::scalaire::Scalaire;
use crate::zp::PremiersDecroissants;

/// Budget de modules écartés avant d'abandonner la campagne.
const BUDGET_MALCHANCE: usize = 200;

/// Premier point d'évaluation des campagnes d'interpolation.
const PREMIER_POINT: u64 = 7;

/* ------------------------ tâches et exécuteurs ------------------------ */

/// Une image à deviner : données réduites et contexte GF(p), autonome,
/// prête à partir sur un autre fil.
#[derive(Clone)]
pub struct TacheImage {
    pub premier: u64,
    pub donnees: Vec<u64>,
    pub genre: Generateur,
    pub q: u64,
    pub sondage: Sondage,
}

impl TacheImage {
    pub fn execute(&self) -> Result<(OperateurZp, Vec<(usize, usize)>), ErreurDevin> {
        devine_par_pgcd(&self.donnees, self.premier, self.genre, self.q, &self.sondage)
    }
}

/// Stratégie d'exécution d'un lot de tâches. Le résultat revient dans
/// l'ordre des tâches ; la fusion reste séquentielle chez l'appelant,
/// donc le résultat final ne dépend pas de la stratégie.
pub type Executeur =
    fn(Vec<TacheImage>) -> Vec<(u64, Result<(OperateurZp, Vec<(usize, usize)>), ErreurDevin>)>;

pub fn execute_sequentiel(
    taches: Vec<TacheImage>,
) -> Vec<(u64, Result<(OperateurZp, Vec<(usize, usize)>), ErreurDevin>)> {
    taches.iter().map(|t| (t.premier, t.execute())).collect()
}

/// Un fil par tâche ; un fil qui panique compte comme module écarté.
pub fn execute_fils(
    taches: Vec<TacheImage>,
) -> Vec<(u64, Result<(OperateurZp, Vec<(usize, usize)>), ErreurDevin>)> {
    std::thread::scope(|portee| {
        let poignees: Vec<_> = taches
            .iter()
            .map(|t| (t.premier, portee.spawn(move || t.execute())))
            .collect();
        poignees
            .into_iter()
            .map(|(p, poignee)| match poignee.join() {
                Ok(resultat) => (p, resultat),
                Err(_) => (p, Err(ErreurDevin::ModuleMalchanceux)),
            })
            .collect()
    })
}

/* ------------------------ réglage ------------------------ */

#[derive(Clone)]
pub struct Reglage {
    pub sondage: Sondage,
    /// Nombre d'images calculées de front à partir du tour 3.
    pub travailleurs: usize,
    pub executeur: Option<Executeur>,
    /// Niveau de compte rendu ; décrémenté de 2 à chaque niveau de
    /// récursion, comme dans la tradition du domaine.
    pub verbosite: i32,
}

impl Default for Reglage {
    fn default() -> Self {
        Self {
            sondage: Sondage::default(),
            travailleurs: 1,
            executeur: None,
            verbosite: 0,
        }
    }
}

/* ------------------------ flux de modules ------------------------ */

enum Flux {
    Premiers(PremiersDecroissants),
    Points { courant: u64, borne: u64 },
}

impl Flux {
    fn prochain(&mut self) -> Option<u64> {
        match self {
            Flux::Premiers(it) => it.next(),
            Flux::Points { courant, borne } => {
                if *courant >= *borne {
                    None
                } else {
                    let v = *courant;
                    *courant += 1;
                    Some(v)
                }
            }
        }
    }
}

/* ------------------------ campagne ------------------------ */

#[derive(Clone, Copy, PartialEq, Eq)]
enum Nature {
    /// ZZ ou QQ : images GF(p), modules entiers.
    EntierAtomique,
    /// GF(p)[t] : images GF(p), modules t − e.
    PointsSurT,
    /// ZZ[t] : images GF(p)[t], modules entiers, récursif.
    EntierPoly,
}

impl Nature {
    /// Le raffinement d'hyperbole ne vaut que pour les coefficients
    /// atomiques (l'image d'un ZZ[t]-problème n'est pas un format fiable).
    fn atomique(self) -> bool {
        !matches!(self, Nature::EntierPoly)
    }
}

/// Devine par images homomorphes. Renvoie l'opérateur et le chemin
/// court effectivement suivi.
pub fn devine_par_images(
    donnees: &[Scalaire],
    algebre: &Algebre,
    reglage: &Reglage,
) -> Result<(Operateur, Vec<(usize, usize)>), ErreurDevin> {
    let (nature, flux) = match &algebre.domaine {
        Domaine::Entiers | Domaine::Rationnels => {
            (Nature::EntierAtomique, Flux::Premiers(PremiersDecroissants::nouveau()))
        }
        Domaine::PolyCorpsPremier(p) => (
            Nature::PointsSurT,
            Flux::Points {
                courant: PREMIER_POINT,
                borne: *p,
            },
        ),
        Domaine::PolyEntiers => {
            (Nature::EntierPoly, Flux::Premiers(PremiersDecroissants::nouveau()))
        }
        Domaine::CorpsPremier(_) => {
            return Err(ErreurDevin::DomaineInattendu(
                "GF(p) se traite sans images homomorphes".into(),
            ))
        }
    };

    Campagne {
        donnees,
        algebre,
        reglage,
        nature,
        flux,
        malchances: 0,
    }
    .lance()
}

struct Campagne<'a> {
    donnees: &'a [Scalaire],
    algebre: &'a Algebre,
    reglage: &'a Reglage,
    nature: Nature,
    flux: Flux,
    malchances: usize,
}

impl Campagne<'_> {
    fn lance(&mut self) -> Result<(Operateur, Vec<(usize, usize)>), ErreurDevin> {
        let genre = self.genre_effectif();
        if self.reglage.verbosite >= 1 {
            info!(
                longueur = self.donnees.len(),
                domaine = self.algebre.domaine.nom(),
                "campagne d'images homomorphes"
            );
        }

        let mut l = Operateur::nul(genre);
        let mut module = Module::Rien;
        let mut ajustement: Option<i64> = None;
        let mut chemin: Option<Vec<(usize, usize)>> = self.reglage.sondage.chemin.clone();
        let mut format_prec: Option<(usize, usize)> = None;
        let mut tour = 0usize;

        while !module.est_clos() {
            tour += 1;

            // politique de chemin du tour
            if tour == 2 {
                if let (Some(ch), Some((r0, d0))) = (&chemin, format_prec) {
                    if self.nature.atomique() {
                        if let Some(&(r1, d1)) = ch.first() {
                            if r1 >= r0 + 2 {
                                if let Some(prefixe) = raffine(r0, d0, r1, d1) {
                                    let mut nouveau = prefixe;
                                    nouveau.extend_from_slice(ch);
                                    chemin = Some(nouveau);
                                }
                                if matches!(genre, Generateur::Algebrique) {
                                    // pas de courbe pour les équations
                                    // algébriques : le format est fixé
                                    chemin = Some(vec![(r0, d0)]);
                                }
                            }
                        }
                    }
                }
            }

            let n_images = 1.max(tour as isize - 3) as usize;
            let parallele = self.reglage.travailleurs > 1
                && tour >= 3
                && !matches!(self.nature, Nature::EntierPoly);
            let n_images = if parallele {
                self.reglage.travailleurs
            } else {
                n_images
            };

            // images du tour, fusionnées entre elles sans reconstruction
            let mut lp = Operateur::nul(genre);
            let mut pmod = Module::Rien;

            if parallele {
                let mut taches = Vec::with_capacity(n_images);
                for _ in 0..n_images {
                    taches.push(self.prepare_tache(chemin.as_deref())?);
                }
                let executeur = self.reglage.executeur.unwrap_or(execute_fils);
                for (p, resultat) in executeur(taches) {
                    match resultat {
                        Ok((image, _)) => {
                            let increment = self.increment(p);
                            match fusionne(&lp, &pmod, &image.vers_operateur(), &increment, false) {
                                Ok((nl, nm)) => (lp, pmod) = (nl, nm),
                                Err(ErreurDevin::ImagesIncompatibles { .. }) => {
                                    self.ecarte(p, "image au format discordant")?;
                                }
                                Err(e) => return Err(e),
                            }
                        }
                        Err(ErreurDevin::ModuleMalchanceux) => {
                            self.ecarte(p, "tâche écartée")?;
                        }
                        Err(e) => return Err(e),
                    }
                }
            } else {
                for _ in 0..n_images {
                    // le premier tour suit toujours le chemin court et le
                    // capture, quitte à remplacer le chemin de l'appelant
                    let demander_court = tour == 1;
                    let (image, court, p) = self.image(chemin.as_deref(), demander_court)?;
                    if demander_court {
                        format_prec = Some((image.ordre(), image.degre().max(0) as usize));
                        chemin = Some(court);
                    }
                    let increment = self.increment(p);
                    match fusionne(&lp, &pmod, &image, &increment, false) {
                        Ok((nl, nm)) => (lp, pmod) = (nl, nm),
                        Err(ErreurDevin::ImagesIncompatibles { .. }) => {
                            self.ecarte(p, "image au format discordant")?;
                        }
                        Err(e) => return Err(e),
                    }
                }
            }

            if lp.est_nul() {
                continue;
            }

            // correction de décentrage : σ^(−ordre/2) sur les coefficients,
            // défaite à la fin ; heuristique propre au décalage sur des
            // modules entiers
            if matches!(genre, Generateur::Decalage) && self.nature != Nature::PointsSurT {
                let adj = *ajustement.get_or_insert(lp.ordre() as i64 / 2);
                if adj != 0 {
                    lp = lp.decale_argument(-adj, None)?;
                }
            }

            if self.reglage.verbosite >= 2 {
                debug!(tour, ordre = lp.ordre(), degre = lp.degre(), "fusion du tour");
            }
            (l, module) = fusionne(&l, &module, &lp, &pmod, true)?;
        }

        if let Some(adj) = ajustement.filter(|&a| a > 0) {
            l = l.decale_argument(adj, None)?;
        }

        if self.reglage.verbosite >= 1 {
            info!(ordre = l.ordre(), degre = l.degre(), "campagne fermée");
        }
        Ok((l, chemin.unwrap_or_default()))
    }

    /// Le générateur des opérateurs manipulés (la différence avant est
    /// déjà normalisée en décalage par la façade).
    fn genre_effectif(&self) -> Generateur {
        self.algebre.generateur
    }

    fn increment(&self, m: u64) -> Module {
        match self.nature {
            Nature::PointsSurT => {
                let p = match &self.algebre.domaine {
                    Domaine::PolyCorpsPremier(p) => *p,
                    _ => unreachable!(),
                };
                Module::Poly(PolyZp::t_moins(m, p))
            }
            _ => Module::Entier(BigInt::from(m)),
        }
    }

    fn ecarte(&mut self, m: u64, raison: &str) -> Result<(), ErreurDevin> {
        self.malchances += 1;
        if self.reglage.verbosite >= 2 {
            debug!(module = m, raison, "module écarté");
        }
        if self.malchances > BUDGET_MALCHANCE {
            warn!(budget = BUDGET_MALCHANCE, "trop de modules écartés");
            return Err(ErreurDevin::AucuneRelation);
        }
        Ok(())
    }

    fn sondage_pour(&self, chemin: Option<&[(usize, usize)]>, court: bool) -> Sondage {
        Sondage {
            chemin: chemin.map(<[(usize, usize)]>::to_vec),
            chemin_court: court,
            ..self.reglage.sondage.clone()
        }
    }

    /// Tire un module chanceux et prépare la tâche GF(p) correspondante.
    fn prepare_tache(
        &mut self,
        chemin: Option<&[(usize, usize)]>,
    ) -> Result<TacheImage, ErreurDevin> {
        let genre = self.genre_effectif();
        loop {
            let m = match self.flux.prochain() {
                Some(m) => m,
                None => {
                    warn!("modules épuisés");
                    return Err(ErreurDevin::AucuneRelation);
                }
            };
            match self.reduit(m) {
                Ok((donnees, q)) => {
                    return Ok(TacheImage {
                        premier: m,
                        donnees,
                        genre,
                        q,
                        sondage: self.sondage_pour(chemin, false),
                    })
                }
                Err(ErreurDevin::ModuleMalchanceux) => self.ecarte(m, "réduction impossible")?,
                Err(e) => return Err(e),
            }
        }
    }

    /// Réduit les données (et q) modulo m : résidus pour une campagne
    /// entière, évaluation en t = m pour une campagne de points.
    fn reduit(&self, m: u64) -> Result<(Vec<u64>, u64), ErreurDevin> {
        let reduit_un = |s: &Scalaire| -> Result<u64, ErreurDevin> {
            let image = match self.nature {
                Nature::PointsSurT => s.evalue_t(m)?,
                _ => s.reduit_mod(m)?,
            };
            match image {
                Scalaire::Mod(v, _) => Ok(v),
                autre => Err(ErreurDevin::TermeIllegal(format!(
                    "résidu inattendu : {}",
                    autre.nom_domaine()
                ))),
            }
        };

        let q = match (&self.algebre.q, self.algebre.generateur) {
            (Some(q), Generateur::QDecalage) => {
                let v = reduit_un(q)?;
                if v == 0 {
                    return Err(ErreurDevin::ModuleMalchanceux);
                }
                v
            }
            _ => 1,
        };

        let mut donnees = Vec::with_capacity(self.donnees.len());
        for s in self.donnees {
            donnees.push(reduit_un(s)?);
        }
        Ok((donnees, q))
    }

    /// Calcule une image : tire un module chanceux, devine sur l'image,
    /// renvoie (opérateur générique, chemin court, module).
    fn image(
        &mut self,
        chemin: Option<&[(usize, usize)]>,
        court: bool,
    ) -> Result<(Operateur, Vec<(usize, usize)>, u64), ErreurDevin> {
        match self.nature {
            Nature::EntierPoly => self.image_recursive(chemin, court),
            _ => {
                let mut tache = self.prepare_tache(chemin)?;
                tache.sondage.chemin_court = court;
                if self.reglage.verbosite >= 2 {
                    debug!(module = tache.premier, "image");
                }
                let (op, suivi) = tache.execute()?;
                Ok((op.vers_operateur(), suivi, tache.premier))
            }
        }
    }

    /// Campagne de type 3 : réduit ZZ[t] → GF(p)[t] et relance une
    /// campagne d'interpolation complète sur l'image.
    fn image_recursive(
        &mut self,
        chemin: Option<&[(usize, usize)]>,
        court: bool,
    ) -> Result<(Operateur, Vec<(usize, usize)>, u64), ErreurDevin> {
        loop {
            let p = match self.flux.prochain() {
                Some(p) => p,
                None => {
                    warn!("modules épuisés");
                    return Err(ErreurDevin::AucuneRelation);
                }
            };

            let reduction: Result<Vec<Scalaire>, ErreurDevin> = self
                .donnees
                .iter()
                .map(|s| {
                    let r = s.reduit_mod(p)?;
                    Ok(match r {
                        Scalaire::Mod(v, p) => Scalaire::PolyMod(PolyZp::constante(v, p)),
                        autre => autre,
                    })
                })
                .collect();
            let donnees_p = match reduction {
                Ok(d) => d,
                Err(ErreurDevin::ModuleMalchanceux) => {
                    self.ecarte(p, "réduction impossible")?;
                    continue;
                }
                Err(e) => return Err(e),
            };

            let q_p = match (&self.algebre.q, self.algebre.generateur) {
                (Some(q), Generateur::QDecalage) => match q.reduit_mod(p) {
                    Ok(qr) => Some(qr),
                    Err(ErreurDevin::ModuleMalchanceux) => {
                        self.ecarte(p, "q non réductible")?;
                        continue;
                    }
                    Err(e) => return Err(e),
                },
                _ => None,
            };

            let interne = Algebre {
                domaine: Domaine::PolyCorpsPremier(p),
                generateur: self.algebre.generateur,
                q: q_p,
            };
            let reglage = Reglage {
                sondage: self.sondage_pour(chemin, court),
                travailleurs: 1,
                executeur: None,
                verbosite: self.reglage.verbosite - 2,
            };
            if self.reglage.verbosite >= 2 {
                debug!(module = p, "image récursive sur GF(p)[t]");
            }
            let (op, suivi) = devine_par_images(&donnees_p, &interne, &reglage)?;
            return Ok((op, suivi, p));
        }
    }
}

/* ------------------------ tests ------------------------ */
