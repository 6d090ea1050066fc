// src/operateur.rs
//
// Opérateurs : polynômes dans le générateur distingué, à coefficients
// polynomiaux en la variable auxiliaire x.
//
// Deux représentations, une par étage :
// - OperateurZp : coefficients PolyZp, pour l'étage GF(p) (deviné brut,
//   assemblage par pgcd à droite). Porte le produit tordu X·c = σ(c)·X + δ(c)
//   et la division à droite pseudo-euclidienne (sans fractions, contenu retiré).
// - Operateur   : coefficients Scalaire, pour la fusion d'images et le
//   résultat final. Immuable une fois rendu.
//
// Convention de normalisation : coefficient dominant du coefficient
// dominant égal à 1.

use std::fmt;

use num_bigint::BigInt;

use crate::algebre::Generateur;
use crate::erreur::ErreurDevin;
use crate::polyzp::PolyZp;
use crate::scalaire::Scalaire;
use crate::zp;

/* ------------------------ OperateurZp ------------------------ */

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OperateurZp {
    coeffs: Vec<PolyZp>, // coeffs[j] devant X^j, dominant non nul
    p: u64,
    genre: Generateur,
    q: u64, // q du q-décalage ; 1 sinon
}

impl OperateurZp {
    pub fn nul(p: u64, genre: Generateur) -> Self {
        Self {
            coeffs: Vec::new(),
            p,
            genre,
            q: 1,
        }
    }

    pub fn nouveau(coeffs: Vec<PolyZp>, p: u64, genre: Generateur, q: u64) -> Self {
        let mut out = Self { coeffs, p, genre, q };
        out.normalise();
        out
    }

    fn normalise(&mut self) {
        while matches!(self.coeffs.last(), Some(c) if c.est_nul()) {
            self.coeffs.pop();
        }
    }

    pub fn est_nul(&self) -> bool {
        self.coeffs.is_empty()
    }

    pub fn ordre(&self) -> usize {
        self.coeffs.len().saturating_sub(1)
    }

    pub fn degre(&self) -> isize {
        self.coeffs.iter().map(|c| c.degre()).max().unwrap_or(-1)
    }

    pub fn premier(&self) -> u64 {
        self.p
    }

    pub fn genre(&self) -> Generateur {
        self.genre
    }

    pub fn coeffs(&self) -> &[PolyZp] {
        &self.coeffs
    }

    pub fn coeff_dominant(&self) -> PolyZp {
        self.coeffs.last().cloned().unwrap_or_else(|| PolyZp::nul(self.p))
    }

    /// σ^k appliqué à un coefficient : x ↦ x + k (décalage), x ↦ q^k·x
    /// (q-décalage), identité (dérivée, algébrique). k peut être négatif.
    pub fn sigma_puiss(&self, c: &PolyZp, k: i64) -> PolyZp {
        let p = self.p;
        match self.genre {
            Generateur::Decalage | Generateur::DifferenceAvant => {
                let r = k.rem_euclid(p as i64) as u64;
                c.decale_arg(r)
            }
            Generateur::QDecalage => {
                let base = if k >= 0 {
                    self.q % p
                } else {
                    zp::inverse(self.q % p, p).unwrap_or(1)
                };
                c.echelle_arg(zp::puissance(base, k.unsigned_abs(), p))
            }
            Generateur::Derivee | Generateur::Algebrique => c.clone(),
        }
    }

    /// Multiplication à gauche par le générateur : X·(Σ cⱼ Xʲ).
    fn fois_generateur(&self) -> OperateurZp {
        let p = self.p;
        let mut coeffs = vec![PolyZp::nul(p); self.coeffs.len() + 1];
        for (j, c) in self.coeffs.iter().enumerate() {
            // X·c = σ(c)·X + δ(c)
            coeffs[j + 1] = coeffs[j + 1].ajoute(&self.sigma_puiss(c, 1));
            if matches!(self.genre, Generateur::Derivee) {
                coeffs[j] = coeffs[j].ajoute(&c.derivee());
            }
        }
        OperateurZp::nouveau(coeffs, p, self.genre, self.q)
    }

    /// Produit tordu (self à gauche).
    pub fn multiplie(&self, autre: &OperateurZp) -> OperateurZp {
        let p = self.p;
        let mut acc = vec![PolyZp::nul(p); self.coeffs.len() + autre.coeffs.len()];
        let mut xi_b = autre.clone(); // X^i · autre
        for (i, a) in self.coeffs.iter().enumerate() {
            if i > 0 {
                xi_b = xi_b.fois_generateur();
            }
            if a.est_nul() {
                continue;
            }
            for (j, b) in xi_b.coeffs.iter().enumerate() {
                acc[j] = acc[j].ajoute(&a.multiplie(b));
            }
        }
        OperateurZp::nouveau(acc, p, self.genre, self.q)
    }

    pub fn multiplie_poly(&self, c: &PolyZp) -> OperateurZp {
        OperateurZp::nouveau(
            self.coeffs.iter().map(|a| a.multiplie(c)).collect(),
            self.p,
            self.genre,
            self.q,
        )
    }

    /// Retire le contenu : divise tous les coefficients par leur pgcd.
    pub fn retire_contenu(&self) -> OperateurZp {
        if self.est_nul() {
            return self.clone();
        }
        let mut g = PolyZp::nul(self.p);
        for c in &self.coeffs {
            g = g.pgcd(c);
            if g.degre() == 0 {
                return self.clone();
            }
        }
        let coeffs = self
            .coeffs
            .iter()
            .map(|c| c.divise_reste(&g).0)
            .collect();
        OperateurZp::nouveau(coeffs, self.p, self.genre, self.q)
    }

    /// Reste de la pseudo-division à droite de self par autre (autre ≠ 0).
    pub fn reste_droit(&self, autre: &OperateurZp) -> OperateurZp {
        let mut a = self.clone();
        let ord_b = autre.ordre();
        while !a.est_nul() && a.ordre() >= ord_b {
            let k = (a.ordre() - ord_b) as i64;
            let lc_a = a.coeff_dominant();
            let lc_bk = self.sigma_puiss(&autre.coeff_dominant(), k);

            // X^k · autre, ordre aligné sur a
            let mut xk_b = autre.clone();
            for _ in 0..k {
                xk_b = xk_b.fois_generateur();
            }

            let gauche = a.multiplie_poly(&lc_bk);
            let droite = xk_b.multiplie_poly(&lc_a);
            let mut coeffs = Vec::with_capacity(gauche.coeffs.len());
            for j in 0..gauche.coeffs.len() {
                let g = gauche.coeffs.get(j).cloned().unwrap_or_else(|| PolyZp::nul(self.p));
                let d = droite.coeffs.get(j).cloned().unwrap_or_else(|| PolyZp::nul(self.p));
                coeffs.push(g.soustrait(&d));
            }
            // le terme de tête s'annule par construction : l'ordre décroît
            a = OperateurZp::nouveau(coeffs, self.p, self.genre, self.q).retire_contenu();
        }
        a
    }

    /// Pgcd à droite (l'analogue du pgcd pour l'algèbre tordue).
    /// Pour le générateur algébrique, dégénère en pgcd commutatif.
    pub fn pgcd_droit(&self, autre: &OperateurZp) -> OperateurZp {
        let mut a = self.retire_contenu();
        let mut b = autre.retire_contenu();
        if a.ordre() < b.ordre() {
            std::mem::swap(&mut a, &mut b);
        }
        while !b.est_nul() {
            let r = a.reste_droit(&b).retire_contenu();
            a = b;
            b = r;
        }
        a.normalise_dominant()
    }

    /// Coefficient dominant du coefficient dominant ramené à 1.
    pub fn normalise_dominant(&self) -> OperateurZp {
        if self.est_nul() {
            return self.clone();
        }
        let lc = self.coeff_dominant().coeff_dominant();
        match zp::inverse(lc, self.p) {
            Some(inv) => OperateurZp::nouveau(
                self.coeffs.iter().map(|c| c.multiplie_scalaire(inv)).collect(),
                self.p,
                self.genre,
                self.q,
            ),
            None => self.clone(),
        }
    }

    /* ------------------------ application ------------------------ */

    /// Applique l'opérateur à une suite (décalage / q-décalage) :
    /// out[n] = Σⱼ cⱼ(n)·a[n+j] (avec n ↦ qⁿ pour le cas q).
    pub fn applique_suite(&self, donnees: &[u64]) -> Vec<u64> {
        let p = self.p;
        if self.est_nul() || donnees.len() <= self.ordre() {
            return Vec::new();
        }
        let mut qn = 1u64; // q^n courant (cas q)
        let mut out = Vec::with_capacity(donnees.len() - self.ordre());
        for n in 0..donnees.len() - self.ordre() {
            let point = match self.genre {
                Generateur::QDecalage => qn,
                _ => (n as u64) % p,
            };
            let mut s = 0u64;
            for (j, c) in self.coeffs.iter().enumerate() {
                s = zp::ajoute(s, zp::multiplie(c.evalue(point), donnees[n + j] % p, p), p);
            }
            out.push(s);
            qn = zp::multiplie(qn, self.q % p, p);
        }
        out
    }

    /// Applique l'opérateur à une série tronquée (dérivée / algébrique) :
    /// Σⱼ cⱼ(x)·f⁽ʲ⁾ (resp. Σⱼ cⱼ(x)·fʲ), tronqué aux termes sûrs.
    pub fn applique_serie(&self, donnees: &[u64]) -> PolyZp {
        let p = self.p;
        let f = PolyZp::depuis_coeffs(donnees.to_vec(), p);
        let tronc = match self.genre {
            Generateur::Derivee => donnees.len().saturating_sub(self.ordre()),
            _ => donnees.len(),
        };
        let mut puissance = match self.genre {
            Generateur::Derivee => f.clone(),
            _ => PolyZp::un(p),
        };
        let mut acc = PolyZp::nul(p);
        for (j, c) in self.coeffs.iter().enumerate() {
            if j > 0 {
                puissance = match self.genre {
                    Generateur::Derivee => puissance.derivee(),
                    _ => puissance.multiplie(&f).tronque(tronc),
                };
            }
            let terme = if matches!(self.genre, Generateur::Derivee) && j == 0 {
                f.multiplie(c)
            } else {
                puissance.multiplie(c)
            };
            acc = acc.ajoute(&terme);
        }
        acc.tronque(tronc)
    }

    /// Conversion vers la représentation générique (coefficients Mod).
    pub fn vers_operateur(&self) -> Operateur {
        let p = self.p;
        let grille = self
            .coeffs
            .iter()
            .map(|c| {
                (0..=c.degre().max(0) as usize)
                    .map(|i| Scalaire::Mod(c.coeff(i), p))
                    .collect()
            })
            .collect();
        Operateur::depuis_grille(grille, self.genre)
    }
}

/* ------------------------ Operateur (Scalaire) ------------------------ */

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Operateur {
    coeffs: Vec<Vec<Scalaire>>, // coeffs[j] = polynôme en x (degré croissant)
    genre: Generateur,
}

impl Operateur {
    pub fn nul(genre: Generateur) -> Self {
        Self {
            coeffs: Vec::new(),
            genre,
        }
    }

    pub fn depuis_grille(coeffs: Vec<Vec<Scalaire>>, genre: Generateur) -> Self {
        let mut out = Self { coeffs, genre };
        out.normalise();
        out
    }

    fn normalise(&mut self) {
        for c in &mut self.coeffs {
            while matches!(c.last(), Some(s) if s.est_nul()) {
                c.pop();
            }
        }
        while matches!(self.coeffs.last(), Some(c) if c.is_empty()) {
            self.coeffs.pop();
        }
    }

    pub fn est_nul(&self) -> bool {
        self.coeffs.is_empty()
    }

    pub fn ordre(&self) -> usize {
        self.coeffs.len().saturating_sub(1)
    }

    pub fn degre(&self) -> isize {
        self.coeffs
            .iter()
            .map(|c| c.len() as isize - 1)
            .max()
            .unwrap_or(-1)
    }

    pub fn genre(&self) -> Generateur {
        self.genre
    }

    pub fn grille(&self) -> &[Vec<Scalaire>] {
        &self.coeffs
    }

    pub fn coeff(&self, j: usize, i: usize) -> Option<&Scalaire> {
        self.coeffs.get(j).and_then(|c| c.get(i))
    }

    /// Un scalaire témoin du domaine des coefficients, s'il y en a un.
    pub fn temoin(&self) -> Option<&Scalaire> {
        self.coeffs.iter().flat_map(|c| c.iter()).next()
    }

    /* ------------------------ σ sur l'argument ------------------------ */

    /// Applique σ^k à chaque coefficient : x ↦ x + k (décalage) ou
    /// multiplication des coefficients par q^{k·i} (q-décalage).
    /// Identité pour la dérivée et l'algébrique.
    pub fn decale_argument(
        &self,
        k: i64,
        q: Option<&Scalaire>,
    ) -> Result<Operateur, ErreurDevin> {
        if k == 0 || self.genre.sigma_identite() {
            return Ok(self.clone());
        }
        let mut grille = Vec::with_capacity(self.coeffs.len());
        match self.genre {
            Generateur::Decalage | Generateur::DifferenceAvant => {
                for c in &self.coeffs {
                    grille.push(compose_x_plus(c, k)?);
                }
            }
            Generateur::QDecalage => {
                let q = q.ok_or_else(|| {
                    ErreurDevin::DomaineInattendu("q-décalage sans q".into())
                })?;
                let facteur = puissance_scalaire(q, k)?;
                for c in &self.coeffs {
                    let mut nc = Vec::with_capacity(c.len());
                    let mut fi = facteur.de_i64(1);
                    for s in c {
                        nc.push(s.fois(&fi)?);
                        fi = fi.fois(&facteur)?;
                    }
                    grille.push(nc);
                }
            }
            Generateur::Derivee | Generateur::Algebrique => unreachable!(),
        }
        Ok(Operateur::depuis_grille(grille, self.genre))
    }

    /* ------------------------ application (tests / vérification) ------------------------ */

    /// Applique un opérateur de décalage à une suite du même domaine :
    /// out[n] = Σⱼ cⱼ(n)·a[n+j]. Réservé au générateur S : pour Q
    /// l'argument des coefficients est qⁿ, pas n, et pour F les
    /// puissances du générateur ne sont pas des décalages purs.
    pub fn applique_rec(&self, donnees: &[Scalaire]) -> Result<Vec<Scalaire>, ErreurDevin> {
        if !matches!(self.genre, Generateur::Decalage) {
            return Err(ErreurDevin::DomaineInattendu(format!(
                "application de suite définie pour Sn, pas pour {}",
                self.genre.symbole()
            )));
        }
        if self.est_nul() || donnees.len() <= self.ordre() {
            return Ok(Vec::new());
        }
        let temoin = match donnees.first() {
            Some(t) => t.clone(),
            None => return Ok(Vec::new()),
        };
        let mut out = Vec::with_capacity(donnees.len() - self.ordre());
        for n in 0..donnees.len() - self.ordre() {
            let x = temoin.de_i64(n as i64);
            let mut s = temoin.zero_comme();
            for (j, c) in self.coeffs.iter().enumerate() {
                let cx = evalue_poly(c, &x, &temoin)?;
                s = s.plus(&cx.fois(&donnees[n + j])?)?;
            }
            out.push(s);
        }
        Ok(out)
    }

    /* ------------------------ traduction S ↔ F ------------------------ */

    /// Réécrit un opérateur en S comme opérateur en F via S = F + 1 :
    /// Σⱼ cⱼ·Sʲ = Σₖ (Σⱼ≥ₖ C(j,k)·cⱼ)·Fᵏ. L'ordre est conservé.
    pub fn vers_difference(&self) -> Result<Operateur, ErreurDevin> {
        let temoin = match self.temoin() {
            Some(t) => t.clone(),
            None => return Ok(Operateur::nul(Generateur::DifferenceAvant)),
        };
        let ordre = self.ordre();
        let mut grille: Vec<Vec<Scalaire>> = vec![Vec::new(); ordre + 1];

        for (k, cible) in grille.iter_mut().enumerate() {
            let mut acc: Vec<Scalaire> = Vec::new();
            for j in k..=ordre {
                let binome = temoin.de_entier(&binomial(j, k));
                for (i, s) in self.coeffs[j].iter().enumerate() {
                    let terme = s.fois(&binome)?;
                    if i < acc.len() {
                        acc[i] = acc[i].plus(&terme)?;
                    } else {
                        acc.push(terme);
                    }
                }
            }
            *cible = acc;
        }
        Ok(Operateur::depuis_grille(grille, Generateur::DifferenceAvant))
    }
}

/* ------------------------ aides polynômes en x sur Scalaire ------------------------ */

fn evalue_poly(c: &[Scalaire], x: &Scalaire, temoin: &Scalaire) -> Result<Scalaire, ErreurDevin> {
    let mut acc = temoin.zero_comme();
    for s in c.iter().rev() {
        acc = acc.fois(x)?.plus(s)?;
    }
    Ok(acc)
}

/// Composition p(x + k) par Horner sur le facteur (x + k).
fn compose_x_plus(c: &[Scalaire], k: i64) -> Result<Vec<Scalaire>, ErreurDevin> {
    let temoin = match c.first() {
        Some(t) => t.clone(),
        None => return Ok(Vec::new()),
    };
    let cst = temoin.de_i64(k);
    let mut acc: Vec<Scalaire> = Vec::new();
    for s in c.iter().rev() {
        // acc = acc·(x + k) + s
        let mut suivant = vec![temoin.zero_comme(); acc.len() + 1];
        for (i, a) in acc.iter().enumerate() {
            suivant[i + 1] = suivant[i + 1].plus(a)?;
            suivant[i] = suivant[i].plus(&a.fois(&cst)?)?;
        }
        if suivant.is_empty() {
            suivant.push(temoin.zero_comme());
        }
        suivant[0] = suivant[0].plus(s)?;
        acc = suivant;
    }
    Ok(acc)
}

fn puissance_scalaire(q: &Scalaire, k: i64) -> Result<Scalaire, ErreurDevin> {
    let base = if k >= 0 { q.clone() } else { inverse_scalaire(q)? };
    let mut acc = base.de_i64(1);
    for _ in 0..k.unsigned_abs() {
        acc = acc.fois(&base)?;
    }
    Ok(acc)
}

fn inverse_scalaire(q: &Scalaire) -> Result<Scalaire, ErreurDevin> {
    match q {
        Scalaire::Mod(v, p) => zp::inverse(*v, *p)
            .map(|i| Scalaire::Mod(i, *p))
            .ok_or(ErreurDevin::ModuleMalchanceux),
        Scalaire::Rationnel(r) => Ok(Scalaire::Rationnel(r.recip())),
        autre => Err(ErreurDevin::TermeIllegal(format!(
            "inverse non défini dans {}",
            autre.nom_domaine()
        ))),
    }
}

fn binomial(n: usize, k: usize) -> BigInt {
    let mut acc = BigInt::from(1);
    for i in 0..k.min(n - k) {
        acc = acc * BigInt::from(n - i) / BigInt::from(i + 1);
    }
    acc
}

/* ------------------------ affichage ------------------------ */

impl fmt::Display for Operateur {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.est_nul() {
            return write!(f, "0");
        }
        let var = match self.genre {
            Generateur::Derivee | Generateur::Algebrique => "x",
            _ => "n",
        };
        let sym = self.genre.symbole();
        let mut premier_terme = true;
        for (j, c) in self.coeffs.iter().enumerate().rev() {
            if c.is_empty() {
                continue;
            }
            if !premier_terme {
                write!(f, " + ")?;
            }
            premier_terme = false;
            write!(f, "({})", formate_poly(c, var))?;
            match j {
                0 => {}
                1 => write!(f, "*{sym}")?,
                _ => write!(f, "*{sym}^{j}")?,
            }
        }
        Ok(())
    }
}

fn formate_poly(c: &[Scalaire], var: &str) -> String {
    let mut morceaux = Vec::new();
    for (i, s) in c.iter().enumerate().rev() {
        if s.est_nul() {
            continue;
        }
        let m = match i {
            0 => format!("{s}"),
            1 => format!("{s}*{var}"),
            _ => format!("{s}*{var}^{i}"),
        };
        morceaux.push(m);
    }
    if morceaux.is_empty() {
        "0".into()
    } else {
        morceaux.join(" + ")
    }
}

/* ------------------------ tests ------------------------ */
