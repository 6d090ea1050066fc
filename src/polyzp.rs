// src/polyzp.rs
//
// Polynômes denses à coefficients dans GF(p), p premier < 2^23.
//
// Représentation : Vec<u64> par degré croissant, sans zéros de tête
// (le polynôme nul a un Vec vide). Le premier p voyage avec le polynôme.
//
// C'est le type de travail de tout l'étage GF(p) : coefficients d'opérateurs,
// séries tronquées (Hermite–Padé), éléments de GF(p)[t], modules produits
// de (t - a), reconstruction de fractions rationnelles.

use std::fmt;

use crate::zp;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PolyZp {
    coeffs: Vec<u64>, // par degré croissant, normalisé
    p: u64,
}

impl PolyZp {
    pub fn nul(p: u64) -> Self {
        Self { coeffs: Vec::new(), p }
    }

    pub fn constante(c: u64, p: u64) -> Self {
        let mut out = Self::nul(p);
        let c = c % p;
        if c != 0 {
            out.coeffs.push(c);
        }
        out
    }

    pub fn un(p: u64) -> Self {
        Self::constante(1, p)
    }

    /// Construit depuis des coefficients (degré croissant), réduit et normalise.
    pub fn depuis_coeffs(coeffs: Vec<u64>, p: u64) -> Self {
        let mut out = Self {
            coeffs: coeffs.into_iter().map(|c| c % p).collect(),
            p,
        };
        out.normalise();
        out
    }

    /// Le polynôme t - a (point d'évaluation a).
    pub fn t_moins(a: u64, p: u64) -> Self {
        Self::depuis_coeffs(vec![zp::oppose(a % p, p), 1], p)
    }

    fn normalise(&mut self) {
        while matches!(self.coeffs.last(), Some(0)) {
            self.coeffs.pop();
        }
    }

    pub fn premier(&self) -> u64 {
        self.p
    }

    pub fn est_nul(&self) -> bool {
        self.coeffs.is_empty()
    }

    pub fn est_un(&self) -> bool {
        self.coeffs == [1]
    }

    /// Degré, avec la convention deg(0) = -1.
    pub fn degre(&self) -> isize {
        self.coeffs.len() as isize - 1
    }

    pub fn coeff(&self, i: usize) -> u64 {
        self.coeffs.get(i).copied().unwrap_or(0)
    }

    pub fn coeffs(&self) -> &[u64] {
        &self.coeffs
    }

    pub fn coeff_dominant(&self) -> u64 {
        self.coeffs.last().copied().unwrap_or(0)
    }

    /* ------------------------ anneau ------------------------ */

    pub fn ajoute(&self, autre: &PolyZp) -> PolyZp {
        debug_assert_eq!(self.p, autre.p);
        let p = self.p;
        let n = self.coeffs.len().max(autre.coeffs.len());
        let mut coeffs = Vec::with_capacity(n);
        for i in 0..n {
            coeffs.push(zp::ajoute(self.coeff(i), autre.coeff(i), p));
        }
        let mut out = PolyZp { coeffs, p };
        out.normalise();
        out
    }

    pub fn soustrait(&self, autre: &PolyZp) -> PolyZp {
        debug_assert_eq!(self.p, autre.p);
        let p = self.p;
        let n = self.coeffs.len().max(autre.coeffs.len());
        let mut coeffs = Vec::with_capacity(n);
        for i in 0..n {
            coeffs.push(zp::soustrait(self.coeff(i), autre.coeff(i), p));
        }
        let mut out = PolyZp { coeffs, p };
        out.normalise();
        out
    }

    pub fn oppose(&self) -> PolyZp {
        let p = self.p;
        PolyZp {
            coeffs: self.coeffs.iter().map(|&c| zp::oppose(c, p)).collect(),
            p,
        }
    }

    pub fn multiplie(&self, autre: &PolyZp) -> PolyZp {
        debug_assert_eq!(self.p, autre.p);
        let p = self.p;
        if self.est_nul() || autre.est_nul() {
            return PolyZp::nul(p);
        }
        let mut coeffs = vec![0u64; self.coeffs.len() + autre.coeffs.len() - 1];
        for (i, &a) in self.coeffs.iter().enumerate() {
            if a == 0 {
                continue;
            }
            for (j, &b) in autre.coeffs.iter().enumerate() {
                coeffs[i + j] = zp::ajoute(coeffs[i + j], zp::multiplie(a, b, p), p);
            }
        }
        let mut out = PolyZp { coeffs, p };
        out.normalise();
        out
    }

    pub fn multiplie_scalaire(&self, c: u64) -> PolyZp {
        let p = self.p;
        let c = c % p;
        if c == 0 {
            return PolyZp::nul(p);
        }
        PolyZp {
            coeffs: self.coeffs.iter().map(|&a| zp::multiplie(a, c, p)).collect(),
            p,
        }
    }

    /// Division euclidienne. Le diviseur ne doit pas être nul.
    pub fn divise_reste(&self, diviseur: &PolyZp) -> (PolyZp, PolyZp) {
        debug_assert_eq!(self.p, diviseur.p);
        debug_assert!(!diviseur.est_nul());
        let p = self.p;

        let dd = diviseur.degre();
        if self.degre() < dd {
            return (PolyZp::nul(p), self.clone());
        }

        let inv_dom = zp::inverse(diviseur.coeff_dominant(), p)
            .unwrap_or(0); // diviseur non nul => dominant inversible

        let mut reste = self.coeffs.clone();
        let mut quotient = vec![0u64; reste.len() - diviseur.coeffs.len() + 1];

        for k in (0..quotient.len()).rev() {
            let haut = reste[k + dd as usize];
            if haut == 0 {
                continue;
            }
            let q = zp::multiplie(haut, inv_dom, p);
            quotient[k] = q;
            for (j, &b) in diviseur.coeffs.iter().enumerate() {
                reste[k + j] = zp::soustrait(reste[k + j], zp::multiplie(q, b, p), p);
            }
        }

        let mut q = PolyZp { coeffs: quotient, p };
        let mut r = PolyZp { coeffs: reste, p };
        q.normalise();
        r.normalise();
        (q, r)
    }

    pub fn reste(&self, diviseur: &PolyZp) -> PolyZp {
        self.divise_reste(diviseur).1
    }

    pub fn rendu_monique(&self) -> PolyZp {
        if self.est_nul() {
            return self.clone();
        }
        let inv = zp::inverse(self.coeff_dominant(), self.p).unwrap_or(1);
        self.multiplie_scalaire(inv)
    }

    /* ------------------------ évaluation & transformations ------------------------ */

    pub fn evalue(&self, a: u64) -> u64 {
        let p = self.p;
        let a = a % p;
        let mut acc = 0u64;
        for &c in self.coeffs.iter().rev() {
            acc = zp::ajoute(zp::multiplie(acc, a, p), c, p);
        }
        acc
    }

    pub fn derivee(&self) -> PolyZp {
        let p = self.p;
        let mut coeffs = Vec::with_capacity(self.coeffs.len().saturating_sub(1));
        for (i, &c) in self.coeffs.iter().enumerate().skip(1) {
            coeffs.push(zp::multiplie(c, (i as u64) % p, p));
        }
        let mut out = PolyZp { coeffs, p };
        out.normalise();
        out
    }

    /// Tronque aux termes de degré < n.
    pub fn tronque(&self, n: usize) -> PolyZp {
        let mut out = PolyZp {
            coeffs: self.coeffs.iter().take(n).copied().collect(),
            p: self.p,
        };
        out.normalise();
        out
    }

    /// Décalage de Taylor : t ↦ t + c. Horner sur le facteur (t + c).
    pub fn decale_arg(&self, c: u64) -> PolyZp {
        let p = self.p;
        let c = c % p;
        if c == 0 || self.est_nul() {
            return self.clone();
        }
        let mut acc = PolyZp::nul(p);
        let x_plus_c = PolyZp::depuis_coeffs(vec![c, 1], p);
        for &a in self.coeffs.iter().rev() {
            acc = acc.multiplie(&x_plus_c).ajoute(&PolyZp::constante(a, p));
        }
        acc
    }

    /// Homothétie de l'argument : t ↦ q·t (le σ des algèbres q).
    pub fn echelle_arg(&self, q: u64) -> PolyZp {
        let p = self.p;
        let mut facteur = 1u64;
        let mut coeffs = Vec::with_capacity(self.coeffs.len());
        for &c in &self.coeffs {
            coeffs.push(zp::multiplie(c, facteur, p));
            facteur = zp::multiplie(facteur, q % p, p);
        }
        let mut out = PolyZp { coeffs, p };
        out.normalise();
        out
    }

    /* ------------------------ pgcd ------------------------ */

    /// Pgcd monique.
    pub fn pgcd(&self, autre: &PolyZp) -> PolyZp {
        let (mut a, mut b) = (self.clone(), autre.clone());
        while !b.est_nul() {
            let r = a.reste(&b);
            a = b;
            b = r;
        }
        a.rendu_monique()
    }

    /// Euclide étendu : retourne (g, s, t) avec g = s·self + t·autre, g monique.
    pub fn pgcd_etendu(&self, autre: &PolyZp) -> (PolyZp, PolyZp, PolyZp) {
        let p = self.p;
        let (mut r0, mut r1) = (self.clone(), autre.clone());
        let (mut s0, mut s1) = (PolyZp::un(p), PolyZp::nul(p));
        let (mut t0, mut t1) = (PolyZp::nul(p), PolyZp::un(p));

        while !r1.est_nul() {
            let (q, r) = r0.divise_reste(&r1);
            (r0, r1) = (r1, r);
            let ns = s0.soustrait(&q.multiplie(&s1));
            (s0, s1) = (s1, ns);
            let nt = t0.soustrait(&q.multiplie(&t1));
            (t0, t1) = (t1, nt);
        }

        if r0.est_nul() {
            return (r0, s0, t0);
        }
        let inv = zp::inverse(r0.coeff_dominant(), p).unwrap_or(1);
        (
            r0.multiplie_scalaire(inv),
            s0.multiplie_scalaire(inv),
            t0.multiplie_scalaire(inv),
        )
    }
}

impl fmt::Display for PolyZp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.est_nul() {
            return write!(f, "0");
        }
        let mut premier_terme = true;
        for (i, &c) in self.coeffs.iter().enumerate().rev() {
            if c == 0 {
                continue;
            }
            if !premier_terme {
                write!(f, " + ")?;
            }
            premier_terme = false;
            match i {
                0 => write!(f, "{c}")?,
                1 if c == 1 => write!(f, "t")?,
                1 => write!(f, "{c}*t")?,
                _ if c == 1 => write!(f, "t^{i}")?,
                _ => write!(f, "{c}*t^{i}")?,
            }
        }
        Ok(())
    }
}

/* ------------------------ tests ------------------------ */
