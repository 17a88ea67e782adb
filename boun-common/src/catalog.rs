///! Department catalog
///!
///! The registration site addresses a listing page by department code
///! (`kisaadi`) and full department name (`bolum`). Some codes own more than
///! one page (e.g. thesis and non-thesis programmes).

use serde::{Deserialize, Serialize};

/// One department code and the page names published under it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Department {
    /// Short code, e.g. "CMPE"
    pub code: String,
    /// Full page names, e.g. ["COMPUTER ENGINEERING"]
    pub names: Vec<String>,
}

/// Ordered, immutable list of departments to scrape
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    departments: Vec<Department>,
}

const BUILTIN_DEPARTMENTS: &[(&str, &[&str])] = &[
    ("ASIA", &["ASIAN STUDIES", "ASIAN STUDIES WITH THESIS"]),
    ("ATA", &["ATATURK INSTITUTE FOR MODERN TURKISH HISTORY"]),
    ("BM", &["BIOMEDICAL ENGINEERING"]),
    ("BIS", &["BUSINESS INFORMATION SYSTEMS", "BUSINESS INFORMATION SYSTEMS (WITH THESIS)"]),
    ("CHE", &["CHEMICAL ENGINEERING"]),
    ("CHEM", &["CHEMISTRY"]),
    ("CE", &["CIVIL ENGINEERING"]),
    ("COGS", &["COGNITIVE SCIENCE"]),
    ("CSE", &["COMPUTATIONAL SCIENCE & ENGINEERING"]),
    ("CET", &["COMPUTER EDUCATION & EDUCATIONAL TECHNOLOGY", "EDUCATIONAL TECHNOLOGY"]),
    ("CMPE", &["COMPUTER ENGINEERING"]),
    ("INT", &["CONFERENCE INTERPRETING"]),
    ("CEM", &["CONSTRUCTION ENGINEERING AND MANAGEMENT"]),
    ("CCS", &["CRITICAL AND CULTURAL STUDIES"]),
    ("ED", &["CURRICULUM AND INSTRUCTIONAL PROGRAMS", "EDUCATIONAL SCIENCES"]),
    ("DSAI", &["DATA SCIENCE AND ARTIFICIAL INTELLIGENCE"]),
    ("PRED", &["EARLY CHILDHOOD EDUCATION"]),
    ("EQE", &["EARTHQUAKE ENGINEERING"]),
    ("EC", &["ECONOMICS"]),
    ("EF", &["ECONOMICS AND FINANCE"]),
    ("EE", &["ELECTRICAL & ELECTRONICS ENGINEERING"]),
    ("ETM", &["ENGINEERING AND TECHNOLOGY MANAGEMENT"]),
    ("LL", &["ENGLISH LITERATURE", "WESTERN LANGUAGES & LITERATURES"]),
    ("ENV", &["ENVIRONMENTAL SCIENCES"]),
    ("ENVT", &["ENVIRONMENTAL TECHNOLOGY"]),
    ("XMBA", &["EXECUTIVE MBA"]),
    ("FE", &["FINANCIAL ENGINEERING"]),
    ("PA", &["FINE ARTS"]),
    ("FLED", &["FOREIGN LANGUAGE EDUCATION"]),
    ("GED", &["GEODESY"]),
    ("GPH", &["GEOPHYSICS"]),
    ("GUID", &["GUIDANCE & PSYCHOLOGICAL COUNSELING"]),
    ("HIST", &["HISTORY"]),
    ("HUM", &["HUMANITIES COURSES COORDINATOR"]),
    ("IE", &["INDUSTRIAL ENGINEERING"]),
    (
        "MIR",
        &[
            "INTERNATIONAL RELATIONS:TURKEY, EUROPE AND THE MIDDLE EAST",
            "INTERNATIONAL RELATIONS:TURKEY, EUROPE AND THE MIDDLE EAST WITH THESIS",
        ],
    ),
    ("INTT", &["INTERNATIONAL TRADE", "INTERNATIONAL TRADE MANAGEMENT"]),
    ("LAW", &["LAW PR."]),
    ("LS", &["LEARNING SCIENCES"]),
    ("LING", &["LINGUISTICS"]),
    ("AD", &["MANAGEMENT"]),
    ("MIS", &["MANAGEMENT INFORMATION SYSTEMS"]),
    ("MATH", &["MATHEMATICS"]),
    ("SCED", &["MATHEMATICS AND SCIENCE EDUCATION"]),
    ("ME", &["MECHANICAL ENGINEERING"]),
    ("MECA", &["MECHATRONICS ENGINEERING (WITH THESIS)"]),
    ("BIO", &["MOLECULAR BIOLOGY & GENETICS"]),
    ("PF", &["PEDAGOGICAL FORMATION CERTIFICATE PROGRAM"]),
    ("PHIL", &["PHILOSOPHY"]),
    ("PE", &["PHYSICAL EDUCATION"]),
    ("PHYS", &["PHYSICS"]),
    ("POLS", &["POLITICAL SCIENCE&INTERNATIONAL RELATIONS"]),
    ("PSY", &["PSYCHOLOGY"]),
    ("YADYOK", &["SCHOOL OF FOREIGN LANGUAGES"]),
    ("SPL", &["SOCIAL POLICY WITH THESIS"]),
    ("SOC", &["SOCIOLOGY"]),
    ("SWE", &["SOFTWARE ENGINEERING", "SOFTWARE ENGINEERING WITH THESIS"]),
    ("TRM", &["SUSTAINABLE TOURISM MANAGEMENT", "TOURISM ADMINISTRATION", "TOURISM MANAGEMENT"]),
    ("SCO", &["SYSTEMS & CONTROL ENGINEERING"]),
    ("WTR", &["TRANSLATION"]),
    ("TR", &["TRANSLATION AND INTERPRETING STUDIES"]),
    ("TK", &["TURKISH COURSES COORDINATOR"]),
    ("TKL", &["TURKISH LANGUAGE & LITERATURE"]),
    ("PRSO", &["UNDERGRADUATE PROGRAM IN PRESCHOOL EDUCATION"]),
];

impl Catalog {
    pub fn new(departments: Vec<Department>) -> Self {
        Self { departments }
    }

    /// The department table published by the registration office
    pub fn builtin() -> Self {
        let departments = BUILTIN_DEPARTMENTS
            .iter()
            .map(|(code, names)| Department {
                code: code.to_string(),
                names: names.iter().map(|n| n.to_string()).collect(),
            })
            .collect();
        Self { departments }
    }

    pub fn departments(&self) -> &[Department] {
        &self.departments
    }

    /// Case-insensitive lookup by department code
    pub fn get(&self, code: &str) -> Option<&Department> {
        self.departments
            .iter()
            .find(|d| d.code.eq_ignore_ascii_case(code.trim()))
    }

    /// A catalog holding only `code`, for single-department runs
    pub fn only(&self, code: &str) -> Option<Catalog> {
        self.get(code).map(|d| Catalog::new(vec![d.clone()]))
    }

    /// Total number of listing pages (one request each)
    pub fn page_count(&self) -> usize {
        self.departments.iter().map(|d| d.names.len()).sum()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}
