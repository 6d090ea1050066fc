// src/reconstruction.rs
//
// Reconstruction rationnelle : retrouver une fraction p/q à partir de son
// résidu a modulo m, en exigeant que p·q soit nettement plus petit que m.
// Deux variantes, même squelette d'Euclide étendu partiel :
// - entière    : a ∈ ZZ/m, critère |p·q| < m/10000
// - polynômiale : a ∈ GF(p)[t]/m, critère deg p + deg q < deg m − 3
//
// La marge (facteur 10000, resp. 3 degrés) est ce qui distingue une vraie
// fraction stabilisée d'une coïncidence : un résidu aléatoire n'a presque
// jamais de représentant aussi court.

use num_bigint::BigInt;
use num_traits::{Signed, Zero};

use crate::erreur::ErreurDevin;
use crate::polyzp::PolyZp;

/* ------------------------ variante entière ------------------------ */

/// Cherche (p, q) avec a ≡ p/q (mod m) et |p·q| < m/10000.
/// `u` borne |q| si fourni. Pour m < 10^6 la marge n'a plus de sens :
/// on retombe sur la reconstruction classique en √(m/2).
pub fn recon_entier(
    a: &BigInt,
    m: &BigInt,
    u: Option<&BigInt>,
) -> Result<(BigInt, BigInt), ErreurDevin> {
    let un = BigInt::from(1);
    let a = ((a % m) + m) % m;

    if a.is_zero() {
        return Ok((BigInt::from(0), un));
    }
    if a == un {
        return Ok((un.clone(), un));
    }
    if &a == &(m - &un) {
        return Ok((BigInt::from(-1), un));
    }

    let borne = m / BigInt::from(10000);
    let borne_rapide = m / BigInt::from(1000000);
    if borne_rapide.is_zero() {
        return recon_entier_classique(&a, m);
    }
    let u = u.cloned().unwrap_or_else(|| m.clone());

    // p = q·a + r·m pour un certain r ; on déroule Euclide sur (m, a)
    let mut p = a.clone();
    let mut q = un.clone();
    let mut pp = m.clone();
    let mut qq = BigInt::from(0);

    let mut sortie = (p.clone(), un.clone());
    let mut score = p.abs();

    // le représentant négatif peut être plus court
    let mp = m - &p;
    if mp < score {
        sortie = (mp.clone(), BigInt::from(-1));
        score = mp;
    }
    if score < borne_rapide {
        return Ok(sortie);
    }

    loop {
        let quo = &pp / &p;
        let np = &pp - &quo * &p;
        let nq = &qq - &quo * &q;
        pp = std::mem::replace(&mut p, np);
        qq = std::mem::replace(&mut q, nq);

        if p.is_zero() || q.abs() > u {
            break;
        }

        let s = (&p * &q).abs();
        if s < score {
            sortie = (p.clone(), q.clone());
            score = s;
            if score < borne_rapide {
                break;
            }
        }
    }

    if score < borne {
        Ok(sortie)
    } else {
        Err(ErreurDevin::Reconstruction)
    }
}

/// Reconstruction classique : |p|, |q| < √(m/2). Utilisée quand le module
/// est trop petit pour la marge en m/10000.
fn recon_entier_classique(a: &BigInt, m: &BigInt) -> Result<(BigInt, BigInt), ErreurDevin> {
    let limite2 = m / BigInt::from(2); // p² < m/2

    let mut p = a.clone();
    let mut q = BigInt::from(1);
    let mut pp = m.clone();
    let mut qq = BigInt::from(0);

    while &(&p * &p) >= &limite2 {
        if p.is_zero() {
            return Err(ErreurDevin::Reconstruction);
        }
        let quo = &pp / &p;
        let np = &pp - &quo * &p;
        let nq = &qq - &quo * &q;
        pp = std::mem::replace(&mut p, np);
        qq = std::mem::replace(&mut q, nq);
    }

    if q.is_zero() || &(&q * &q) * BigInt::from(2) > *m {
        return Err(ErreurDevin::Reconstruction);
    }
    if q.is_negative() {
        p = -p;
        q = -q;
    }
    Ok((p, q))
}

/* ------------------------ variante polynômiale ------------------------ */

/// Cherche (p, q) avec a ≡ p/q (mod m) et deg p + deg q < deg m − 3,
/// dénominateur rendu monique. `u` borne deg q si fourni. Pour deg m ≤ 6
/// on retombe sur la reconstruction classique en deg m / 2.
pub fn recon_poly(
    a: &PolyZp,
    m: &PolyZp,
    u: Option<isize>,
) -> Result<(PolyZp, PolyZp), ErreurDevin> {
    let prem = m.premier();
    let un = PolyZp::un(prem);
    let a = a.reste(m);

    if a.est_nul() || a == un || a == PolyZp::constante(prem - 1, prem) {
        return Ok((a, un));
    }

    let borne = m.degre() - 3;
    let borne_rapide = m.degre() - 6;
    if borne_rapide <= 0 {
        return recon_poly_classique(&a, m);
    }
    let u = u.unwrap_or(m.degre());

    let mut p = a.clone();
    let mut q = un.clone();
    let mut pp = m.clone();
    let mut qq = PolyZp::nul(prem);

    let mut sortie = (p.clone(), un);
    let mut score = p.degre();

    loop {
        let (quo, np) = pp.divise_reste(&p);
        let nq = qq.soustrait(&quo.multiplie(&q));
        pp = std::mem::replace(&mut p, np);
        qq = std::mem::replace(&mut q, nq);

        if p.est_nul() || q.degre() > u {
            break;
        }

        let s = p.degre() + q.degre();
        if s < score {
            sortie = (p.clone(), q.clone());
            score = s;
            if score < borne_rapide {
                break;
            }
        }
    }

    if score < borne {
        let (p, q) = sortie;
        let inv_lc = crate::zp::inverse(q.coeff_dominant(), prem)
            .ok_or(ErreurDevin::Reconstruction)?;
        Ok((p.multiplie_scalaire(inv_lc), q.multiplie_scalaire(inv_lc)))
    } else {
        Err(ErreurDevin::Reconstruction)
    }
}

fn recon_poly_classique(a: &PolyZp, m: &PolyZp) -> Result<(PolyZp, PolyZp), ErreurDevin> {
    let prem = m.premier();
    let borne_num = (m.degre() - 1) / 2;

    let mut p = a.clone();
    let mut q = PolyZp::un(prem);
    let mut pp = m.clone();
    let mut qq = PolyZp::nul(prem);

    while p.degre() > borne_num {
        let (quo, np) = pp.divise_reste(&p);
        let nq = qq.soustrait(&quo.multiplie(&q));
        pp = std::mem::replace(&mut p, np);
        qq = std::mem::replace(&mut q, nq);
        if p.est_nul() {
            return Err(ErreurDevin::Reconstruction);
        }
    }

    if q.est_nul() || p.degre() + q.degre() >= m.degre() {
        return Err(ErreurDevin::Reconstruction);
    }
    // contrôle : q·a ≡ p (mod m)
    if q.multiplie(&a).soustrait(&p).reste(m) != PolyZp::nul(prem) {
        return Err(ErreurDevin::Reconstruction);
    }
    let inv_lc = crate::zp::inverse(q.coeff_dominant(), prem)
        .ok_or(ErreurDevin::Reconstruction)?;
    Ok((p.multiplie_scalaire(inv_lc), q.multiplie_scalaire(inv_lc)))
}

/* ------------------------ tests ------------------------ */
