//! Government support scheme catalog

use serde::Serialize;

use crate::types::Language;

/// Static text in both supported languages
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct LocalizedText {
    pub en: &'static str,
    pub ml: &'static str,
}

impl LocalizedText {
    pub fn get(&self, language: Language) -> &'static str {
        match language {
            Language::English => self.en,
            Language::Malayalam => self.ml,
        }
    }
}

/// Static list in both supported languages
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct LocalizedList {
    pub en: &'static [&'static str],
    pub ml: &'static [&'static str],
}

impl LocalizedList {
    pub fn get(&self, language: Language) -> &'static [&'static str] {
        match language {
            Language::English => self.en,
            Language::Malayalam => self.ml,
        }
    }
}

/// A government financial support or assistance programme
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Scheme {
    pub id: i64,
    pub name: LocalizedText,
    pub description: LocalizedText,
    pub tag: LocalizedText,
    pub eligibility: LocalizedText,
    pub documents: LocalizedList,
    pub application_process: LocalizedText,
    pub official_link: &'static str,
    pub category: &'static str,
}

impl Scheme {
    /// Case-insensitive match of an already lowercased query against the
    /// localized name, description and tag
    pub fn matches_query(&self, query_lower: &str, language: Language) -> bool {
        [self.name, self.description, self.tag]
            .iter()
            .any(|text| text.get(language).to_lowercase().contains(query_lower))
    }
}

const fn text(en: &'static str, ml: &'static str) -> LocalizedText {
    LocalizedText { en, ml }
}

pub static SCHEMES: [Scheme; 6] = [
    Scheme {
        id: 1,
        name: text("PM-KISAN Samman Nidhi", "പിഎം-കിസാൻ സമ്മാൻ നിധി"),
        description: text(
            "Direct income support to all landholding farmers' families. ₹6,000 per year in three installments.",
            "എല്ലാ ഭൂവുടമസ്ഥ കർഷക കുടുംബങ്ങൾക്കും നേരിട്ടുള്ള വരുമാന പിന്തുണ. മൂന്ന് ഗഡുകളായി വർഷത്തിൽ ₹6,000.",
        ),
        tag: text("Income Support", "വരുമാന പിന്തുണ"),
        eligibility: text(
            "All landholding farmers (except those in excluded categories)",
            "എല്ലാ ഭൂവുടമസ്ഥ കർഷകർ (ഒഴിവാക്കപ്പെട്ട വിഭാഗങ്ങളിലുള്ളവർ ഒഴികെ)",
        ),
        documents: LocalizedList {
            en: &["Aadhaar Card", "Bank Account Details", "Land Records"],
            ml: &["ആധാർ കാർഡ്", "ബാങ്ക് അക്കൗണ്ട് വിവരങ്ങൾ", "ഭൂമി രേഖകൾ"],
        },
        application_process: text(
            "Apply online at pmkisan.gov.in or visit nearest Common Service Center",
            "pmkisan.gov.in-ൽ ഓൺലൈനായി അപേക്ഷിക്കുക അല്ലെങ്കിൽ അടുത്തുള്ള കോമൺ സർവീസ് സെന്റർ സന്ദർശിക്കുക",
        ),
        official_link: "https://pmkisan.gov.in",
        category: "income_support",
    },
    Scheme {
        id: 2,
        name: text("Pradhan Mantri Fasal Bima Yojana", "പ്രധാനമന്ത്രി ഫസൽ ബീമ യോജന"),
        description: text(
            "Crop insurance scheme providing financial support to farmers suffering crop loss/damage.",
            "വിള നഷ്ടം/കേടുപാടുകൾ അനുഭവിക്കുന്ന കർഷകർക്ക് സാമ്പത്തിക പിന്തുണ നൽകുന്ന വിള ഇൻഷുറൻസ് പദ്ധതി.",
        ),
        tag: text("Insurance", "ഇൻഷുറൻസ്"),
        eligibility: text(
            "All farmers growing notified crops in notified areas",
            "അറിയിപ്പ് പ്രദേശങ്ങളിൽ അറിയിപ്പ് വിളകൾ കൃഷി ചെയ്യുന്ന എല്ലാ കർഷകരും",
        ),
        documents: LocalizedList {
            en: &[
                "Aadhaar Card",
                "Bank Account Details",
                "Land Records",
                "Sowing Certificate",
            ],
            ml: &[
                "ആധാർ കാർഡ്",
                "ബാങ്ക് അക്കൗണ്ട് വിവരങ്ങൾ",
                "ഭൂമി രേഖകൾ",
                "വിത്ത് സർട്ടിഫിക്കറ്റ്",
            ],
        },
        application_process: text(
            "Apply through banks, insurance companies, or online portal",
            "ബാങ്കുകൾ, ഇൻഷുറൻസ് കമ്പനികൾ അല്ലെങ്കിൽ ഓൺലൈൻ പോർട്ടൽ വഴി അപേക്ഷിക്കുക",
        ),
        official_link: "https://pmfby.gov.in",
        category: "insurance",
    },
    Scheme {
        id: 3,
        name: text("Soil Health Card Scheme", "മണ്ണ് ആരോഗ്യ കാർഡ് പദ്ധതി"),
        description: text(
            "Promotes soil testing and provides soil health cards to farmers for better crop planning.",
            "മണ്ണ് പരിശോധനയെ പ്രോത്സാഹിപ്പിക്കുകയും മികച്ച വിള ആസൂത്രണത്തിനായി കർഷകർക്ക് മണ്ണ് ആരോഗ്യ കാർഡുകൾ നൽകുകയും ചെയ്യുന്നു.",
        ),
        tag: text("Soil Testing", "മണ്ണ് പരിശോധന"),
        eligibility: text(
            "All farmers with agricultural land",
            "കാർഷിക ഭൂമിയുള്ള എല്ലാ കർഷകരും",
        ),
        documents: LocalizedList {
            en: &["Land Records", "Aadhaar Card"],
            ml: &["ഭൂമി രേഖകൾ", "ആധാർ കാർഡ്"],
        },
        application_process: text(
            "Contact local agricultural extension officer or soil testing laboratory",
            "പ്രാദേശിക കാർഷിക വിപുലീകരണ ഉദ്യോഗസ്ഥനെ അല്ലെങ്കിൽ മണ്ണ് പരിശോധന ലബോറട്ടറിയെ ബന്ധപ്പെടുക",
        ),
        official_link: "https://soilhealth.dac.gov.in",
        category: "soil_testing",
    },
    Scheme {
        id: 4,
        name: text("PM Kisan Credit Card", "പിഎം കിസാൻ ക്രെഡിറ്റ് കാർഡ്"),
        description: text(
            "Provides farmers with timely access to credit for their production needs.",
            "കർഷകർക്ക് അവരുടെ ഉൽപ്പാദന ആവശ്യങ്ങൾക്കായി സമയബന്ധിത വായ്പാ സൗകര്യം നൽകുന്നു.",
        ),
        tag: text("Credit", "വായ്പ"),
        eligibility: text(
            "Farmers with land ownership documents or tenant farmers",
            "ഭൂവുടമസ്ഥത്വ രേഖകളുള്ള കർഷകർ അല്ലെങ്കിൽ കുടിയാൻ കർഷകർ",
        ),
        documents: LocalizedList {
            en: &["Aadhaar Card", "PAN Card", "Land Records", "Bank Account Details"],
            ml: &[
                "ആധാർ കാർഡ്",
                "പാൻ കാർഡ്",
                "ഭൂമി രേഖകൾ",
                "ബാങ്ക് അക്കൗണ്ട് വിവരങ്ങൾ",
            ],
        },
        application_process: text(
            "Apply at any bank branch with required documents",
            "ആവശ്യമായ രേഖകളുമായി ഏതെങ്കിലും ബാങ്ക് ബ്രാഞ്ചിൽ അപേക്ഷിക്കുക",
        ),
        official_link: "https://www.nabard.org/content1.aspx?id=1048&catid=23",
        category: "credit",
    },
    Scheme {
        id: 5,
        name: text("Rashtriya Krishi Vikas Yojana (RKVY)", "രാഷ്ട്രീയ കൃഷി വികാസ് യോജന"),
        description: text(
            "Comprehensive development of agriculture and allied sectors through state-specific interventions.",
            "സംസ്ഥാന-നിർദ്ദിഷ്ട ഇടപെടലുകളിലൂടെ കൃഷിയുടെയും അനുബന്ധ മേഖലകളുടെയും സമഗ്ര വികസനം.",
        ),
        tag: text("Development", "വികസനം"),
        eligibility: text(
            "State governments and implementing agencies",
            "സംസ്ഥാന സർക്കാരുകളും നടപ്പാക്കൽ ഏജൻസികളും",
        ),
        documents: LocalizedList {
            en: &[
                "Project Proposal",
                "State Government Approval",
                "Implementation Plan",
            ],
            ml: &[
                "പ്രോജക്ട് പ്രൊപ്പോസൽ",
                "സംസ്ഥാന സർക്കാർ അനുമതി",
                "നടപ്പാക്കൽ പദ്ധതി",
            ],
        },
        application_process: text(
            "Apply through state agriculture department or designated nodal agencies",
            "സംസ്ഥാന കാർഷിക വകുപ്പ് അല്ലെങ്കിൽ നിയുക്ത നോഡൽ ഏജൻസികൾ വഴി അപേക്ഷിക്കുക",
        ),
        official_link: "https://rkvy.nic.in",
        category: "development",
    },
    Scheme {
        id: 6,
        name: text(
            "National Mission for Sustainable Agriculture (NMSA)",
            "ദേശീയ സുസ്ഥിര കാർഷിക മിഷൻ",
        ),
        description: text(
            "Promotes sustainable agriculture practices through climate-resilient technologies and water conservation.",
            "കാലാവസ്ഥാ പ്രതിരോധ സാങ്കേതികവിദ്യകളും ജല സംരക്ഷണവും വഴി സുസ്ഥിര കാർഷിക രീതികൾ പ്രോത്സാഹിപ്പിക്കുന്നു.",
        ),
        tag: text("Sustainability", "സുസ്ഥിരത"),
        eligibility: text(
            "All farmers adopting sustainable practices",
            "സുസ്ഥിര രീതികൾ സ്വീകരിക്കുന്ന എല്ലാ കർഷകരും",
        ),
        documents: LocalizedList {
            en: &["Aadhaar Card", "Land Records", "Sustainable Practice Certificate"],
            ml: &[
                "ആധാർ കാർഡ്",
                "ഭൂമി രേഖകൾ",
                "സുസ്ഥിര പ്രാക്ടീസ് സർട്ടിഫിക്കറ്റ്",
            ],
        },
        application_process: text(
            "Contact local KVK or agricultural extension center",
            "പ്രാദേശിക കെവികെ അല്ലെങ്കിൽ കാർഷിക വിപുലീകരണ കേന്ദ്രം ബന്ധപ്പെടുക",
        ),
        official_link: "https://nmsa.dac.gov.in",
        category: "sustainability",
    },
];

/// Look up a scheme by id
pub fn find_scheme(id: i64) -> Option<&'static Scheme> {
    SCHEMES.iter().find(|s| s.id == id)
}

/// Catalog filter: a scheme is kept when the query matches its localized
/// text OR its category equals the requested one. With neither given the
/// whole catalog is returned.
pub fn search_schemes(
    query: Option<&str>,
    category: Option<&str>,
    language: Language,
) -> Vec<&'static Scheme> {
    let query = query
        .map(|q| q.trim().to_lowercase())
        .filter(|q| !q.is_empty());
    let category = category.map(str::trim).filter(|c| !c.is_empty());

    if query.is_none() && category.is_none() {
        return SCHEMES.iter().collect();
    }

    SCHEMES
        .iter()
        .filter(|scheme| {
            let by_query = query
                .as_deref()
                .map(|q| scheme.matches_query(q, language))
                .unwrap_or(false);
            let by_category = category.map(|c| scheme.category == c).unwrap_or(false);
            by_query || by_category
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_has_six_unique_ids() {
        let mut ids: Vec<_> = SCHEMES.iter().map(|s| s.id).collect();
        ids.dedup();
        assert_eq!(ids, vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn search_by_query_is_case_insensitive() {
        let found = search_schemes(Some("INSURANCE"), None, Language::English);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, 2);
    }

    #[test]
    fn search_by_malayalam_tag() {
        let found = search_schemes(Some("വായ്പ"), None, Language::Malayalam);
        assert!(found.iter().any(|s| s.id == 4));
    }

    #[test]
    fn query_or_category_both_count() {
        let found = search_schemes(Some("soil"), Some("credit"), Language::English);
        let ids: Vec<_> = found.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![3, 4]);
    }

    #[test]
    fn empty_search_returns_all() {
        assert_eq!(search_schemes(None, Some("  "), Language::English).len(), 6);
    }

    #[test]
    fn serializes_camel_case_keys() {
        let json = serde_json::to_value(find_scheme(1).unwrap()).unwrap();
        assert_eq!(json["officialLink"], "https://pmkisan.gov.in");
        assert!(json["applicationProcess"]["ml"].is_string());
        assert_eq!(json["documents"]["en"][0], "Aadhaar Card");
    }
}
