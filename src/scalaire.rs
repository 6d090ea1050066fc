// src/scalaire.rs
//
// Les éléments de domaines de coefficients, sous forme d'énumération FERMÉE :
// - Entier      : élément de ZZ
// - Rationnel   : élément de QQ
// - Mod         : élément de GF(p) (valeur, premier)
// - PolyEntier  : élément de ZZ[t]
// - PolyMod     : élément de GF(p)[t]
//
// Toute l'inspection de domaine passe par ce tag : pas de typage dynamique
// ouvert. Les opérations mixtes entre variantes incompatibles sont des
// TermeIllegal (bogue d'appelant), jamais des paniques.
//
// Fournit aussi les homomorphismes de réduction (mod p, évaluation en t = a)
// avec le signal ModuleMalchanceux, et l'Euclide entier (pgcd étendu,
// modulo euclidien) dont la reconstruction a besoin.

use std::fmt;

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, Zero};

use crate::erreur::ErreurDevin;
use crate::polyzp::PolyZp;
use crate::zp;

/* ------------------------ PolyZ : ZZ[t] dense ------------------------ */

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PolyZ {
    coeffs: Vec<BigInt>, // par degré croissant, normalisé
}

impl PolyZ {
    pub fn nul() -> Self {
        Self { coeffs: Vec::new() }
    }

    pub fn constante(c: BigInt) -> Self {
        let mut out = Self::nul();
        if !c.is_zero() {
            out.coeffs.push(c);
        }
        out
    }

    pub fn depuis_coeffs(coeffs: Vec<BigInt>) -> Self {
        let mut out = Self { coeffs };
        out.normalise();
        out
    }

    fn normalise(&mut self) {
        while matches!(self.coeffs.last(), Some(c) if c.is_zero()) {
            self.coeffs.pop();
        }
    }

    pub fn est_nul(&self) -> bool {
        self.coeffs.is_empty()
    }

    pub fn degre(&self) -> isize {
        self.coeffs.len() as isize - 1
    }

    pub fn coeff(&self, i: usize) -> BigInt {
        self.coeffs.get(i).cloned().unwrap_or_else(BigInt::zero)
    }

    pub fn coeffs(&self) -> &[BigInt] {
        &self.coeffs
    }

    pub fn ajoute(&self, autre: &PolyZ) -> PolyZ {
        let n = self.coeffs.len().max(autre.coeffs.len());
        let mut coeffs = Vec::with_capacity(n);
        for i in 0..n {
            coeffs.push(self.coeff(i) + autre.coeff(i));
        }
        PolyZ::depuis_coeffs(coeffs)
    }

    pub fn multiplie(&self, autre: &PolyZ) -> PolyZ {
        if self.est_nul() || autre.est_nul() {
            return PolyZ::nul();
        }
        let mut coeffs = vec![BigInt::zero(); self.coeffs.len() + autre.coeffs.len() - 1];
        for (i, a) in self.coeffs.iter().enumerate() {
            for (j, b) in autre.coeffs.iter().enumerate() {
                coeffs[i + j] += a * b;
            }
        }
        PolyZ::depuis_coeffs(coeffs)
    }

    pub fn multiplie_entier(&self, c: &BigInt) -> PolyZ {
        PolyZ::depuis_coeffs(self.coeffs.iter().map(|a| a * c).collect())
    }

    /// Réduction coefficient par coefficient dans GF(p).
    pub fn reduit_mod(&self, p: u64) -> PolyZp {
        PolyZp::depuis_coeffs(
            self.coeffs.iter().map(|c| residu_mod(c, p)).collect(),
            p,
        )
    }
}

impl fmt::Display for PolyZ {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.est_nul() {
            return write!(f, "0");
        }
        let mut premier_terme = true;
        for (i, c) in self.coeffs.iter().enumerate().rev() {
            if c.is_zero() {
                continue;
            }
            if !premier_terme {
                write!(f, " + ")?;
            }
            premier_terme = false;
            match i {
                0 => write!(f, "{c}")?,
                1 if c.is_one() => write!(f, "t")?,
                1 => write!(f, "({c})*t")?,
                _ if c.is_one() => write!(f, "t^{i}")?,
                _ => write!(f, "({c})*t^{i}")?,
            }
        }
        Ok(())
    }
}

/* ------------------------ Scalaire ------------------------ */

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Scalaire {
    Entier(BigInt),
    Rationnel(BigRational),
    Mod(u64, u64), // (valeur, premier)
    PolyEntier(PolyZ),
    PolyMod(PolyZp),
}

impl Scalaire {
    pub fn entier(n: i64) -> Scalaire {
        Scalaire::Entier(BigInt::from(n))
    }

    pub fn est_nul(&self) -> bool {
        match self {
            Scalaire::Entier(n) => n.is_zero(),
            Scalaire::Rationnel(r) => r.is_zero(),
            Scalaire::Mod(v, _) => *v == 0,
            Scalaire::PolyEntier(q) => q.est_nul(),
            Scalaire::PolyMod(q) => q.est_nul(),
        }
    }

    /// Le zéro du même domaine que `self`.
    pub fn zero_comme(&self) -> Scalaire {
        self.de_i64(0)
    }

    /// Plonge un petit entier dans le domaine de `self`.
    pub fn de_i64(&self, v: i64) -> Scalaire {
        self.de_entier(&BigInt::from(v))
    }

    /// Plonge un grand entier dans le domaine de `self`.
    pub fn de_entier(&self, v: &BigInt) -> Scalaire {
        match self {
            Scalaire::Entier(_) => Scalaire::Entier(v.clone()),
            Scalaire::Rationnel(_) => Scalaire::Rationnel(BigRational::from_integer(v.clone())),
            Scalaire::Mod(_, p) => Scalaire::Mod(residu_mod(v, *p), *p),
            Scalaire::PolyEntier(_) => Scalaire::PolyEntier(PolyZ::constante(v.clone())),
            Scalaire::PolyMod(q) => {
                let p = q.premier();
                Scalaire::PolyMod(PolyZp::constante(residu_mod(v, p), p))
            }
        }
    }

    pub fn plus(&self, autre: &Scalaire) -> Result<Scalaire, ErreurDevin> {
        use Scalaire::*;
        match (self, autre) {
            (Entier(a), Entier(b)) => Ok(Entier(a + b)),
            (Rationnel(a), Rationnel(b)) => Ok(Rationnel(a + b)),
            (Mod(a, p), Mod(b, q)) if p == q => Ok(Mod(zp::ajoute(*a, *b, *p), *p)),
            (PolyEntier(a), PolyEntier(b)) => Ok(PolyEntier(a.ajoute(b))),
            (PolyMod(a), PolyMod(b)) if a.premier() == b.premier() => Ok(PolyMod(a.ajoute(b))),
            // plongements naturels de ZZ
            (Entier(a), Rationnel(b)) | (Rationnel(b), Entier(a)) => {
                Ok(Rationnel(BigRational::from_integer(a.clone()) + b))
            }
            (Entier(a), PolyEntier(b)) | (PolyEntier(b), Entier(a)) => {
                Ok(PolyEntier(b.ajoute(&PolyZ::constante(a.clone()))))
            }
            _ => Err(melange(self, autre)),
        }
    }

    pub fn fois(&self, autre: &Scalaire) -> Result<Scalaire, ErreurDevin> {
        use Scalaire::*;
        match (self, autre) {
            (Entier(a), Entier(b)) => Ok(Entier(a * b)),
            (Rationnel(a), Rationnel(b)) => Ok(Rationnel(a * b)),
            (Mod(a, p), Mod(b, q)) if p == q => Ok(Mod(zp::multiplie(*a, *b, *p), *p)),
            (PolyEntier(a), PolyEntier(b)) => Ok(PolyEntier(a.multiplie(b))),
            (PolyMod(a), PolyMod(b)) if a.premier() == b.premier() => {
                Ok(PolyMod(a.multiplie(b)))
            }
            (Entier(a), Rationnel(b)) | (Rationnel(b), Entier(a)) => {
                Ok(Rationnel(BigRational::from_integer(a.clone()) * b))
            }
            (Entier(a), PolyEntier(b)) | (PolyEntier(b), Entier(a)) => {
                Ok(PolyEntier(b.multiplie_entier(a)))
            }
            _ => Err(melange(self, autre)),
        }
    }

    /// Nom court du domaine, pour les messages d'erreur.
    pub fn nom_domaine(&self) -> &'static str {
        match self {
            Scalaire::Entier(_) => "ZZ",
            Scalaire::Rationnel(_) => "QQ",
            Scalaire::Mod(_, _) => "GF(p)",
            Scalaire::PolyEntier(_) => "ZZ[t]",
            Scalaire::PolyMod(_) => "GF(p)[t]",
        }
    }

    /* ------------------------ homomorphismes de réduction ------------------------ */

    /// Réduction modulo p. Pour un rationnel, le dénominateur est inversé
    /// modulo p ; s'il est divisible par p, le module est malchanceux.
    pub fn reduit_mod(&self, p: u64) -> Result<Scalaire, ErreurDevin> {
        match self {
            Scalaire::Entier(n) => Ok(Scalaire::Mod(residu_mod(n, p), p)),
            Scalaire::Rationnel(r) => {
                let den = residu_mod(r.denom(), p);
                let inv = zp::inverse(den, p).ok_or(ErreurDevin::ModuleMalchanceux)?;
                let num = residu_mod(r.numer(), p);
                Ok(Scalaire::Mod(zp::multiplie(num, inv, p), p))
            }
            Scalaire::PolyEntier(q) => Ok(Scalaire::PolyMod(q.reduit_mod(p))),
            autre => Err(ErreurDevin::TermeIllegal(format!(
                "réduction mod p impossible depuis {}",
                autre.nom_domaine()
            ))),
        }
    }

    /// Évaluation en t = a (GF(p)[t] → GF(p)).
    pub fn evalue_t(&self, a: u64) -> Result<Scalaire, ErreurDevin> {
        match self {
            Scalaire::PolyMod(q) => Ok(Scalaire::Mod(q.evalue(a), q.premier())),
            autre => Err(ErreurDevin::TermeIllegal(format!(
                "évaluation en t impossible depuis {}",
                autre.nom_domaine()
            ))),
        }
    }
}

impl fmt::Display for Scalaire {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalaire::Entier(n) => write!(f, "{n}"),
            Scalaire::Rationnel(r) => {
                if r.denom().is_one() {
                    write!(f, "{}", r.numer())
                } else {
                    write!(f, "{}/{}", r.numer(), r.denom())
                }
            }
            Scalaire::Mod(v, _) => write!(f, "{v}"),
            Scalaire::PolyEntier(q) => write!(f, "{q}"),
            Scalaire::PolyMod(q) => write!(f, "{q}"),
        }
    }
}

fn melange(a: &Scalaire, b: &Scalaire) -> ErreurDevin {
    ErreurDevin::TermeIllegal(format!(
        "opération entre domaines incompatibles : {} et {}",
        a.nom_domaine(),
        b.nom_domaine()
    ))
}

/* ------------------------ Euclide entier ------------------------ */

/// Reste euclidien dans [0, m), m > 0.
pub fn mod_euclid(a: &BigInt, m: &BigInt) -> BigInt {
    if m.is_zero() {
        return a.clone();
    }
    let mut r = a % m;
    if r.is_negative() {
        r += m;
    }
    r
}

/// Résidu d'un grand entier modulo un petit premier.
pub fn residu_mod(a: &BigInt, p: u64) -> u64 {
    let r = mod_euclid(a, &BigInt::from(p));
    // r ∈ [0, p), p < 2^63 : la conversion est sûre
    let (_, chiffres) = r.to_u64_digits();
    chiffres.first().copied().unwrap_or(0)
}

/// Euclide étendu : (g, s, t) avec g = s·a + t·b, g ≥ 0.
pub fn pgcd_etendu(a: &BigInt, b: &BigInt) -> (BigInt, BigInt, BigInt) {
    let (mut r0, mut r1) = (a.clone(), b.clone());
    let (mut s0, mut s1) = (BigInt::one(), BigInt::zero());
    let (mut t0, mut t1) = (BigInt::zero(), BigInt::one());

    while !r1.is_zero() {
        let q = &r0 / &r1;
        let nr = &r0 - &q * &r1;
        (r0, r1) = (r1, nr);
        let ns = &s0 - &q * &s1;
        (s0, s1) = (s1, ns);
        let nt = &t0 - &q * &t1;
        (t0, t1) = (t1, nt);
    }

    if r0.is_negative() {
        (-r0, -s0, -t0)
    } else {
        (r0, s0, t0)
    }
}

/* ------------------------ tests ------------------------ */
