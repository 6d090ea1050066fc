//! Devineur d'opérateurs définis
//!
//! Cherche le plus petit opérateur (récurrence, équation différentielle,
//! q-récurrence ou équation algébrique) annulant une suite finie de
//! termes exacts, par images homomorphes et algèbre linéaire sur GF(p).
//!
//! Organisation interne :
//! - scalaire.rs       : domaines de coefficients (énumération fermée)
//! - algebre.rs        : domaine + générateur (S, D, Q, C, F)
//! - zp.rs             : arithmétique GF(p), premiers décroissants
//! - polyzp.rs         : GF(p)[t] dense, Euclide, décalage d'argument
//! - operateur.rs      : opérateurs tordus, produit, pgcd à droite
//! - brut.rs           : systèmes d'ansatz, noyau droit mod p
//! - chemin.rs         : planification des couples (ordre, degré)
//! - assemblage.rs     : parcours du chemin + pgcd des solutions
//! - reconstruction.rs : reconstruction rationnelle (entière, polynomiale)
//! - fusion.rs         : restes chinois / interpolation des images
//! - orchestre.rs      : campagnes d'images, ajustement, récursion
//! - facade.rs         : `devine` et ses raccourcis
//! - lecture.rs        : suites données en texte

pub mod algebre;
pub mod assemblage;
pub mod brut;
pub mod chemin;
pub mod erreur;
pub mod facade;
pub mod fusion;
pub mod lecture;
pub mod operateur;
pub mod orchestre;
pub mod polyzp;
pub mod reconstruction;
pub mod scalaire;
pub mod zp;

#[cfg(test)]
mod tests_scientifiques;

#[cfg(test)]
mod tests_robustesse;

// API publique minimale
pub use algebre::{Algebre, Domaine, Generateur};
pub use erreur::ErreurDevin;
pub use facade::{devine, devine_alg, devine_court, devine_diff, devine_qrec, devine_rec, Config};
pub use operateur::Operateur;
pub use scalaire::Scalaire;
