// src/facade.rs
//
// Le point d'entrée public : `devine` choisit la stratégie d'après le
// domaine des coefficients, après validation des données et
// normalisation de la différence avant en décalage.
//
// - GF(p)          : recherche directe par pgcd à droite ;
// - ZZ, QQ, ZZ[t]  : images modulo des premiers, restes chinois ;
// - GF(p)[t]       : images par évaluation, interpolation.

use tracing::info;

use crate::algebre::{Algebre, Domaine, Generateur};
use crate::assemblage::{devine_par_pgcd, Sondage};
use crate::brut::Resolveur;
use crate::erreur::ErreurDevin;
use crate::operateur::Operateur;
use crate::orchestre::{devine_par_images, Executeur, Reglage};
use crate::polyzp::PolyZp;
use crate::scalaire::{PolyZ, Scalaire};

/// Configuration d'une devinette. Immuable : l'état de recherche
/// (chemin courant, tour, décentrage) vit chez l'orchestrateur.
#[derive(Clone)]
pub struct Config {
    pub ordre_min: usize,
    pub ordre_max: Option<usize>,
    pub degre_min: usize,
    pub degre_max: Option<usize>,
    /// Limite le nombre de lignes du système au minimum + coupe.
    pub coupe: Option<usize>,
    /// Termes gardés en réserve pour confirmer les solutions.
    pub assure: usize,
    /// Chemin (ordre, degré) imposé ; sinon le chemin par défaut.
    pub chemin: Option<Vec<(usize, usize)>>,
    /// Remplaçant du solveur de noyau par défaut.
    pub resolveur: Option<Resolveur>,
    pub verbosite: u8,
    /// Images calculées de front à partir du tour 3 (1 = séquentiel).
    pub travailleurs: usize,
    pub executeur: Option<Executeur>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ordre_min: 1,
            ordre_max: None,
            degre_min: 0,
            degre_max: None,
            coupe: Some(25),
            assure: 0,
            chemin: None,
            resolveur: None,
            verbosite: 0,
            travailleurs: 1,
            executeur: None,
        }
    }
}

impl Config {
    fn sondage(&self) -> Sondage {
        Sondage {
            bornes: crate::chemin::Bornes {
                min_ordre: self.ordre_min,
                max_ordre: self.ordre_max,
                min_degre: self.degre_min,
                max_degre: self.degre_max,
            },
            chemin: self.chemin.clone(),
            coupe: self.coupe,
            assure: self.assure,
            resolveur: self.resolveur,
            chemin_court: false,
        }
    }

    fn reglage(&self) -> Reglage {
        Reglage {
            sondage: self.sondage(),
            travailleurs: self.travailleurs.max(1),
            executeur: self.executeur,
            verbosite: self.verbosite as i32,
        }
    }
}

/* ------------------------ entrée principale ------------------------ */

/// Cherche un opérateur minimal annulant `donnees` dans l'algèbre
/// donnée. AucuneRelation si les termes fournis n'en déterminent pas.
pub fn devine(
    donnees: &[Scalaire],
    algebre: &Algebre,
    config: &Config,
) -> Result<Operateur, ErreurDevin> {
    devine_court(donnees, algebre, config).map(|(op, _)| op)
}

/// Comme `devine`, et renvoie aussi le chemin court : les couples
/// (ordre, degré) où des relations ont été trouvées.
pub fn devine_court(
    donnees: &[Scalaire],
    algebre: &Algebre,
    config: &Config,
) -> Result<(Operateur, Vec<(usize, usize)>), ErreurDevin> {
    algebre.verifie(donnees)?;
    info!(
        longueur = donnees.len(),
        domaine = algebre.domaine.nom(),
        generateur = algebre.generateur.symbole(),
        "devinette"
    );

    // la différence avant se traite comme un décalage, la traduction
    // S = F + 1 se faisant sur l'opérateur final
    if matches!(algebre.generateur, Generateur::DifferenceAvant) {
        let decale = Algebre {
            domaine: algebre.domaine.clone(),
            generateur: Generateur::Decalage,
            q: None,
        };
        let (op, chemin) = devine_court(donnees, &decale, config)?;
        return Ok((op.vers_difference()?, chemin));
    }

    if donnees.is_empty() {
        return Err(ErreurDevin::DonneesInsuffisantes { requis: 4, recu: 0 });
    }
    // la suite nulle est annulée par l'unité : seul opérateur d'ordre 0
    // admis
    if donnees.iter().all(Scalaire::est_nul) {
        return Ok((operateur_unite(algebre), Vec::new()));
    }

    match &algebre.domaine {
        Domaine::CorpsPremier(p) => {
            let brutes: Vec<u64> = donnees
                .iter()
                .map(|s| match s {
                    Scalaire::Mod(v, _) => *v,
                    _ => unreachable!("données validées"),
                })
                .collect();
            let q = match (&algebre.q, algebre.generateur) {
                (Some(Scalaire::Mod(v, _)), Generateur::QDecalage) => *v,
                (Some(autre), Generateur::QDecalage) => {
                    return Err(ErreurDevin::TermeIllegal(format!(
                        "q hors de GF(p) : {}",
                        autre.nom_domaine()
                    )))
                }
                _ => 1,
            };
            let (op, chemin) =
                devine_par_pgcd(&brutes, *p, algebre.generateur, q, &config.sondage())?;
            Ok((op.vers_operateur(), chemin))
        }
        _ => devine_par_images(donnees, algebre, &config.reglage()),
    }
}

/// L'unité de l'algèbre, opérateur d'ordre 0.
fn operateur_unite(algebre: &Algebre) -> Operateur {
    let un = match &algebre.domaine {
        Domaine::CorpsPremier(p) => Scalaire::Mod(1, *p),
        Domaine::Entiers | Domaine::Rationnels => Scalaire::entier(1),
        Domaine::PolyCorpsPremier(p) => Scalaire::PolyMod(PolyZp::constante(1, *p)),
        Domaine::PolyEntiers => Scalaire::PolyEntier(PolyZ::constante(1.into())),
    };
    Operateur::depuis_grille(vec![vec![un]], algebre.generateur)
}

/* ------------------------ raccourcis ------------------------ */

/// Récurrence linéaire à coefficients polynomiaux.
pub fn devine_rec(
    donnees: &[Scalaire],
    domaine: Domaine,
    config: &Config,
) -> Result<Operateur, ErreurDevin> {
    devine(donnees, &Algebre::decalage(domaine), config)
}

/// Équation différentielle linéaire pour la série Σ a(n)·xⁿ.
pub fn devine_diff(
    donnees: &[Scalaire],
    domaine: Domaine,
    config: &Config,
) -> Result<Operateur, ErreurDevin> {
    devine(donnees, &Algebre::derivee(domaine), config)
}

/// q-récurrence linéaire.
pub fn devine_qrec(
    donnees: &[Scalaire],
    domaine: Domaine,
    q: Scalaire,
    config: &Config,
) -> Result<Operateur, ErreurDevin> {
    devine(donnees, &Algebre::q_decalage(domaine, q), config)
}

/// Équation algébrique pour la série Σ a(n)·xⁿ.
pub fn devine_alg(
    donnees: &[Scalaire],
    domaine: Domaine,
    config: &Config,
) -> Result<Operateur, ErreurDevin> {
    devine(donnees, &Algebre::algebrique(domaine), config)
}

/* ------------------------ tests ------------------------ */
