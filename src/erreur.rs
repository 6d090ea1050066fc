// src/erreur.rs
//
// Taxonomie d'erreurs du moteur de devinette.
//
// Deux familles bien distinctes :
// - erreurs FATALES, remontées telles quelles à l'appelant
//   (données insuffisantes, domaine inattendu, terme illégal, images incompatibles,
//   aucune relation sur tout le chemin exploré) ;
// - signaux INTERNES, attendus et réessayés, qui ne doivent jamais s'échapper
//   (reconstruction pas encore convergée, module malchanceux).

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ErreurDevin {
    /// Pas assez de termes pour l'ansatz demandé. `requis` est le minimum exact.
    #[error("données insuffisantes : {requis} termes requis, {recu} reçus")]
    DonneesInsuffisantes { requis: usize, recu: usize },

    /// Tout le chemin (ordre, degré) planifié a été épuisé sans succès.
    #[error("aucune relation trouvée")]
    AucuneRelation,

    /// Algèbre ou domaine de coefficients hors du périmètre supporté.
    #[error("domaine inattendu : {0}")]
    DomaineInattendu(String),

    /// Un terme de la suite n'appartient pas au domaine annoncé.
    #[error("terme illégal dans la suite : {0}")]
    TermeIllegal(String),

    /// Deux images partielles de (ordre, degré) différents : incohérence structurelle.
    #[error("images incompatibles : (ordre, degré) = ({ordre_a}, {degre_a}) contre ({ordre_b}, {degre_b})")]
    ImagesIncompatibles {
        ordre_a: usize,
        degre_a: isize,
        ordre_b: usize,
        degre_b: isize,
    },

    /// Reconstruction rationnelle pas encore possible avec le module accumulé.
    /// Signal interne : l'appelant accumule une image de plus.
    #[error("reconstruction rationnelle non convergée")]
    Reconstruction,

    /// Réduction impossible sous ce module (ex : dénominateur divisible par p).
    /// Signal interne : l'orchestrateur réessaie avec un module frais.
    #[error("module malchanceux")]
    ModuleMalchanceux,
}
