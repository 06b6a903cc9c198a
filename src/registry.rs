// Static campus / certification / region configuration
use serde::Deserialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CampusInfo {
    pub code: String,
    pub label: String,
    #[serde(default)]
    pub contact: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CertificationInfo {
    pub code: String,
    pub label: String,
    #[serde(default)]
    pub note: Option<String>,
}

/// Campus and certification tables, fixed at deploy time.
///
/// Entry order is significant: derived campus lists and tie-breaks in the
/// certification counts follow it.
#[derive(Debug, Clone, PartialEq)]
pub struct Registry {
    pub campuses: Vec<CampusInfo>,
    pub certifications: Vec<CertificationInfo>,
}

impl Default for Registry {
    fn default() -> Self {
        Self {
            campuses: default_campuses(),
            certifications: default_certifications(),
        }
    }
}

impl Registry {
    pub fn new(campuses: Vec<CampusInfo>, certifications: Vec<CertificationInfo>) -> Self {
        Self { campuses, certifications }
    }

    pub fn campus(&self, code: &str) -> Option<&CampusInfo> {
        self.campuses.iter().find(|c| c.code == code)
    }

    pub fn certification(&self, code: &str) -> Option<&CertificationInfo> {
        self.certifications.iter().find(|c| c.code == code)
    }

    pub fn campus_codes(&self) -> impl Iterator<Item = &str> {
        self.campuses.iter().map(|c| c.code.as_str())
    }

    pub fn certification_codes(&self) -> impl Iterator<Item = &str> {
        self.certifications.iter().map(|c| c.code.as_str())
    }

    /// Region name -> campus codes (registry order within a region).
    pub fn regions(&self) -> BTreeMap<String, Vec<String>> {
        let mut regions: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for campus in &self.campuses {
            if let Some(region) = &campus.region {
                regions.entry(region.clone()).or_default().push(campus.code.clone());
            }
        }
        regions
    }

    /// Campus codes of a region, `None` when the region is not registered.
    pub fn region_campuses(&self, region: &str) -> Option<Vec<&str>> {
        let codes: Vec<&str> = self
            .campuses
            .iter()
            .filter(|c| c.region.as_deref() == Some(region))
            .map(|c| c.code.as_str())
            .collect();
        if codes.is_empty() { None } else { Some(codes) }
    }
}

fn campus(code: &str, label: &str, contact: &str, region: &str) -> CampusInfo {
    CampusInfo {
        code: code.into(),
        label: label.into(),
        contact: Some(contact.into()),
        region: Some(region.into()),
    }
}

fn cert(code: &str, label: &str) -> CertificationInfo {
    CertificationInfo {
        code: code.into(),
        label: label.into(),
        note: None,
    }
}

pub fn default_campuses() -> Vec<CampusInfo> {
    vec![
        campus("UCLA", "UCLA", "UCLA - Jane Doe (jane.doe@ucla.edu)", "SoCal"),
        campus("UCD_H", "UC Davis Health", "UC Davis Health - John Smith (john.smith@ucd.edu)", "NorCal"),
        campus("UCB", "UC Berkeley", "UC Berkeley - Alex Kim (alex.kim@berkeley.edu)", "NorCal"),
        campus("UCR", "UC Riverside", "UC Riverside - Maria Lopez (maria.lopez@ucr.edu)", "SoCal"),
        campus("UCM", "UC Merced", "UC Merced - Omar Patel (omar.patel@ucmerced.edu)", "Central"),
        campus("UCSC", "UC Santa Cruz", "UC Santa Cruz - Riley Nguyen (riley.nguyen@ucsc.edu)", "NorCal"),
    ]
}

pub fn default_certifications() -> Vec<CertificationInfo> {
    let mut certs = vec![
        cert("OG", "Organic"),
        cert("CH", "Certified Humane"),
        cert("FT", "Fair Trade"),
        cert("RAC", "Regenerative Ag."),
        cert("AGA", "Grassfed Assoc."),
        cert("AWA", "Animal Welfare"),
        cert("GAP", "Global Animal Partnership"),
        cert("AHC", "American Humane Certified"),
        cert("HFAC", "Humane Farm Care"),
        cert("MSC", "Marine Stewardship Council"),
        cert("BAP", "Best Aquaculture Practices"),
        cert("MBA", "Monterrey Bay Aquarium"),
    ];
    if let Some(bap) = certs.iter_mut().find(|c| c.code == "BAP") {
        bap.note = Some("not included in AASHE STARS".into());
    }
    certs
}
