// src/algebre.rs
//
// Le cadre algébrique d'une devinette :
// - Domaine    : anneau des coefficients (énumération fermée, cinq cas)
// - Generateur : le générateur distingué de l'algèbre (S, D, Q, C, F)
// - Algebre    : (domaine, générateur, q éventuel)
//
// La différence avant F est normalisée en décalage S avant tout calcul
// (ça ne change ni l'ordre ni le degré) ; la traduction inverse se fait
// sur l'opérateur final (operateur.rs).

use crate::erreur::ErreurDevin;
use crate::scalaire::Scalaire;

/// Les cinq domaines de coefficients supportés. Tout le reste est
/// DomaineInattendu dès l'entrée.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Domaine {
    /// GF(p), p premier.
    CorpsPremier(u64),
    /// ZZ.
    Entiers,
    /// QQ — ramené à des opérateurs sur ZZ, les données restant rationnelles.
    Rationnels,
    /// GF(p)[t].
    PolyCorpsPremier(u64),
    /// ZZ[t].
    PolyEntiers,
}

impl Domaine {
    /// Un terme appartient-il au domaine ?
    pub fn contient(&self, s: &Scalaire) -> bool {
        match (self, s) {
            (Domaine::CorpsPremier(p), Scalaire::Mod(_, q)) => p == q,
            (Domaine::Entiers, Scalaire::Entier(_)) => true,
            // QQ accepte aussi les entiers (plongement naturel)
            (Domaine::Rationnels, Scalaire::Rationnel(_) | Scalaire::Entier(_)) => true,
            (Domaine::PolyCorpsPremier(p), Scalaire::PolyMod(q)) => *p == q.premier(),
            // ZZ[t] accepte les constantes entières
            (Domaine::PolyEntiers, Scalaire::PolyEntier(_) | Scalaire::Entier(_)) => true,
            _ => false,
        }
    }

    pub fn nom(&self) -> String {
        match self {
            Domaine::CorpsPremier(p) => format!("GF({p})"),
            Domaine::Entiers => "ZZ".into(),
            Domaine::Rationnels => "QQ".into(),
            Domaine::PolyCorpsPremier(p) => format!("GF({p})[t]"),
            Domaine::PolyEntiers => "ZZ[t]".into(),
        }
    }
}

/// Le générateur distingué de l'algèbre d'opérateurs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Generateur {
    /// Décalage S : x ↦ x + 1 (récurrences).
    Decalage,
    /// Dérivation D (équations différentielles).
    Derivee,
    /// q-décalage Q : x ↦ q·x (q-récurrences). Le q vit dans l'Algebre.
    QDecalage,
    /// Variable commutative C (équations algébriques).
    Algebrique,
    /// Différence avant F = S − 1 ; normalisée en S avant calcul.
    DifferenceAvant,
}

impl Generateur {
    /// Symbole d'affichage, dans la convention du domaine d'origine.
    pub fn symbole(&self) -> &'static str {
        match self {
            Generateur::Decalage => "Sn",
            Generateur::Derivee => "Dx",
            Generateur::QDecalage => "Qn",
            Generateur::Algebrique => "C",
            Generateur::DifferenceAvant => "Fn",
        }
    }

    /// σ est-il l'identité ? (vrai pour D et C : les coefficients ne bougent
    /// pas en traversant le générateur)
    pub fn sigma_identite(&self) -> bool {
        matches!(self, Generateur::Derivee | Generateur::Algebrique)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Algebre {
    pub domaine: Domaine,
    pub generateur: Generateur,
    /// Le q des algèbres de q-décalage ; None sinon.
    pub q: Option<Scalaire>,
}

impl Algebre {
    pub fn decalage(domaine: Domaine) -> Self {
        Self {
            domaine,
            generateur: Generateur::Decalage,
            q: None,
        }
    }

    pub fn derivee(domaine: Domaine) -> Self {
        Self {
            domaine,
            generateur: Generateur::Derivee,
            q: None,
        }
    }

    pub fn q_decalage(domaine: Domaine, q: Scalaire) -> Self {
        Self {
            domaine,
            generateur: Generateur::QDecalage,
            q: Some(q),
        }
    }

    pub fn algebrique(domaine: Domaine) -> Self {
        Self {
            domaine,
            generateur: Generateur::Algebrique,
            q: None,
        }
    }

    pub fn difference_avant(domaine: Domaine) -> Self {
        Self {
            domaine,
            generateur: Generateur::DifferenceAvant,
            q: None,
        }
    }

    /// Change le domaine en gardant générateur et q.
    pub fn sur(&self, domaine: Domaine) -> Algebre {
        Algebre {
            domaine,
            generateur: self.generateur,
            q: self.q.clone(),
        }
    }

    /// Vérifie le domaine (p premier pour GF(p) et GF(p)[t]) et
    /// l'appartenance de chaque terme au domaine annoncé.
    /// Erreur d'entrée fatale, jamais réessayée.
    pub fn verifie(&self, donnees: &[Scalaire]) -> Result<(), ErreurDevin> {
        if let Domaine::CorpsPremier(p) | Domaine::PolyCorpsPremier(p) = self.domaine {
            if !crate::zp::est_premier(p) {
                return Err(ErreurDevin::DomaineInattendu(format!(
                    "module non premier : {p}"
                )));
            }
        }
        for (i, s) in donnees.iter().enumerate() {
            if !self.domaine.contient(s) {
                return Err(ErreurDevin::TermeIllegal(format!(
                    "terme {i} ({}) hors du domaine {}",
                    s.nom_domaine(),
                    self.domaine.nom()
                )));
            }
        }
        if matches!(self.generateur, Generateur::QDecalage) && self.q.is_none() {
            return Err(ErreurDevin::DomaineInattendu(
                "algèbre de q-décalage sans q".into(),
            ));
        }
        Ok(())
    }
}
