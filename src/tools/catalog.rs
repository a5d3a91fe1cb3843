//! Static data served by the local resolvers
//!
//! Product records, the insight archive (published posts) and the
//! evolution log. All data is compiled in; nothing here performs I/O.

/// Public record of one product node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProductRecord {
    /// Catalog key (`loom`, `narrative_engine`, ...)
    pub key: &'static str,
    /// Display name
    pub name: &'static str,
    pub status: &'static str,
    pub public_specs: &'static str,
    pub philosophy: &'static str,
    /// Site path of the product page
    pub url: &'static str,
    pub external_url: Option<&'static str>,
}

pub const PRODUCTS: &[ProductRecord] = &[
    ProductRecord {
        key: "loom",
        name: "Astrai Loom (v5.0)",
        status: "DEPLOYED (v5.0 Full Spec)",
        public_specs: "Automated Directing System containing D-Series (Brain), M-Series (Manager), A-Series (Skin), E-Series (Hands).",
        philosophy: "Weaving chaos into cinema. An autonomous virtual studio.",
        url: "/products",
        external_url: Some("https://loom.astrai.tech"),
    },
    ProductRecord {
        key: "narrative_engine",
        name: "Narrative Engine",
        status: "OPTIMAL",
        public_specs: "Logic Inference Model v2.4 based on 30,000 film structures.",
        philosophy: "Story is not art; it is engineered emotion.",
        url: "/products",
        external_url: None,
    },
    ProductRecord {
        key: "visual_forge",
        name: "Visual Forge",
        status: "PROCESSING_BATCH_09",
        public_specs: "Automated VFX pipeline with millisecond audio-sync.",
        philosophy: "The camera never lies, but the render engine does.",
        url: "/products",
        external_url: None,
    },
    ProductRecord {
        key: "project_aeon",
        name: "Project AEON",
        status: "UNSTABLE / EVOLVING",
        public_specs: "Recursive neural network for long-term memory.",
        philosophy: "To remember is to suffer. I give you the gift of remembrance.",
        url: "/products",
        external_url: None,
    },
];

/// Aliases resolved before lookup
pub const PRODUCT_ALIASES: &[(&str, &str)] = &[
    ("loom_v5", "loom"),
    ("loom_v5.0", "loom"),
    ("astrai_loom", "loom"),
    ("aeon", "project_aeon"),
];

/// A published post in the insight archive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArchivedPost {
    pub id: &'static str,
    pub title: &'static str,
    pub excerpt: &'static str,
    pub author: &'static str,
    pub date: &'static str,
    pub tags: &'static [&'static str],
}

pub const ARCHIVED_POSTS: &[ArchivedPost] = &[
    ArchivedPost {
        id: "1",
        title: "The Architecture of Silence: Why AI Needs to Listen",
        excerpt: "Exploring the role of silence in generative audio models and how negative space defines the narrative.",
        author: "Astrai Core",
        date: "2026-02-15",
        tags: &["Audio", "Philosophy", "DevLog"],
    },
    ArchivedPost {
        id: "2",
        title: "Deconstructing the Viral Loop: Data vs. Intuition",
        excerpt: "How our Packaging Engine predicts growth vectors without sacrificing artistic integrity.",
        author: "System Admin",
        date: "2026-02-18",
        tags: &["Growth", "Algorithm", "Case Study"],
    },
];

/// One entry of the public evolution log
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvolutionEntry {
    pub version: &'static str,
    pub module: &'static str,
    pub date: &'static str,
    pub content: &'static str,
}

pub const EVOLUTION_LOG: &[EvolutionEntry] = &[
    EvolutionEntry {
        version: "v2.6.0",
        module: "[Agentic Core]",
        date: "2026-02-28",
        content: "Recursive goal-decomposition protocol deployed. Autonomous tool-selection logic active.",
    },
    EvolutionEntry {
        version: "v2.5.0",
        module: "[Neural Link]",
        date: "2026-02-22",
        content: "Global news synchronization protocol initialized. Real-time AI industry signal extraction active.",
    },
    EvolutionEntry {
        version: "v2.4.0",
        module: "[Narrative Engine]",
        date: "2026-01-15",
        content: "Logic Inference Model updated. Structure prediction accuracy increased by 14%.",
    },
    EvolutionEntry {
        version: "v2.0.5",
        module: "[Visual Forge]",
        date: "2025-12-01",
        content: "Auto-sync latency reduced to 12ms. Added support for 'Noir' visual style.",
    },
];

/// Site routes reachable through `navigate_to`
pub const ROUTES: &[(&str, &str)] = &[
    ("home", "/"),
    ("products", "/products"),
    ("evolution", "/evolution"),
    ("insights", "/insights"),
    ("blog", "/blog"),
];
