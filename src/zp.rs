// src/zp.rs
//
// Arithmétique modulo un premier p tenant dans u64.
//
// Les éléments sont des u64 réduits dans [0, p). Le corps fourni par
// l'appelant peut approcher 2^64, donc sommes et produits montent en
// u128 ; seuls les modules internes des campagnes d'images restent
// sous 2^23.
//
// Fournit aussi l'itérateur de premiers "taille mot" : les premiers en ordre
// décroissant depuis 2^23 jusqu'au plancher de sûreté 1000, pour biaiser vers
// les grands premiers "typiques".

/// Borne supérieure (exclue) des premiers utilisés comme modules.
pub const PREMIER_INIT: u64 = 1 << 23;

/// Plancher de sûreté : en-dessous, un premier ne porte plus assez d'information.
pub const PREMIER_PLANCHER: u64 = 1000;

#[inline]
pub fn ajoute(a: u64, b: u64, p: u64) -> u64 {
    let s = a as u128 + b as u128;
    let p = p as u128;
    (if s >= p { s - p } else { s }) as u64
}

#[inline]
pub fn soustrait(a: u64, b: u64, p: u64) -> u64 {
    if a >= b {
        a - b
    } else {
        a + p - b
    }
}

#[inline]
pub fn oppose(a: u64, p: u64) -> u64 {
    if a == 0 {
        0
    } else {
        p - a
    }
}

#[inline]
pub fn multiplie(a: u64, b: u64, p: u64) -> u64 {
    ((a as u128 * b as u128) % p as u128) as u64
}

pub fn puissance(mut base: u64, mut exp: u64, p: u64) -> u64 {
    let mut acc = 1 % p;
    base %= p;
    while exp > 0 {
        if exp & 1 == 1 {
            acc = multiplie(acc, base, p);
        }
        exp >>= 1;
        if exp > 0 {
            base = multiplie(base, base, p);
        }
    }
    acc
}

/// Inverse modulaire par Euclide étendu.
/// Retourne None si a ≡ 0 (mod p) — p est premier, tout le reste est inversible.
pub fn inverse(a: u64, p: u64) -> Option<u64> {
    let a = a % p;
    if a == 0 {
        return None;
    }

    // Euclide étendu sur (p, a), coefficients signés (i128 : les
    // coefficients de Bézout peuvent dépasser i64 quand p frôle 2^64).
    let (mut r0, mut r1) = (p as i128, a as i128);
    let (mut t0, mut t1) = (0i128, 1i128);

    while r1 != 0 {
        let q = r0 / r1;
        (r0, r1) = (r1, r0 - q * r1);
        (t0, t1) = (t1, t0 - q * t1);
    }

    // r0 == 1 car p premier et a non nul
    let mut t = t0 % (p as i128);
    if t < 0 {
        t += p as i128;
    }
    Some(t as u64)
}

/// Signé symétrique : représentant de a dans (-p/2, p/2].
pub fn symetrique(a: u64, p: u64) -> i64 {
    let a = a % p;
    if a as u128 * 2 > p as u128 {
        (a as i128 - p as i128) as i64
    } else {
        a as i64
    }
}

/* ------------------------ premiers ------------------------ */

/// Témoins de Miller–Rabin suffisants pour trancher tout n < 2^64.
const TEMOINS: [u64; 12] = [2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37];

/// Test de primalité déterministe (Miller–Rabin). Couvre tout u64 : les
/// corps fournis par l'appelant comme les modules internes.
pub fn est_premier(n: u64) -> bool {
    if n < 2 {
        return false;
    }
    for &t in &TEMOINS {
        if n == t {
            return true;
        }
        if n % t == 0 {
            return false;
        }
    }
    let mut d = n - 1;
    let mut s = 0u32;
    while d % 2 == 0 {
        d /= 2;
        s += 1;
    }
    'temoin: for &t in &TEMOINS {
        let mut x = puissance(t, d, n);
        if x == 1 || x == n - 1 {
            continue;
        }
        for _ in 1..s {
            x = multiplie(x, x, n);
            if x == n - 1 {
                continue 'temoin;
            }
        }
        return false;
    }
    true
}

/// Premiers décroissants dans (plancher, init), comme `_word_size_primes`.
#[derive(Clone, Debug)]
pub struct PremiersDecroissants {
    courant: u64,
    plancher: u64,
}

impl PremiersDecroissants {
    pub fn nouveau() -> Self {
        Self::depuis(PREMIER_INIT, PREMIER_PLANCHER)
    }

    pub fn depuis(init: u64, plancher: u64) -> Self {
        Self {
            courant: init,
            plancher,
        }
    }
}

impl Iterator for PremiersDecroissants {
    type Item = u64;

    fn next(&mut self) -> Option<u64> {
        let mut n = self.courant;
        while n > self.plancher + 1 {
            n -= 1;
            if est_premier(n) {
                self.courant = n;
                return Some(n);
            }
        }
        None
    }
}

/* ------------------------ tests ------------------------ */
