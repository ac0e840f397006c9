//! Keyword-driven intent signals for incoming chat text.
//!
//! Every [`Intent`] owns an ordered list of lowercase patterns and a match mode. The signals
//! are independent: a single query can be a greeting, legal, a scenario, and a follow-up at
//! the same time. Matching is plain substring search and deliberately favors recall, so short
//! patterns such as `"my"` or `"ip"` also fire inside longer words.

use std::sync::OnceLock;

/// User text together with the form used for matching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    /// Text exactly as the caller sent it.
    pub raw: String,
    /// Trimmed, lowercased text.
    pub normalized: String,
}

impl Query {
    /// Build a query from raw user input.
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let normalized = raw.trim().to_lowercase();
        Self { raw, normalized }
    }
}

/// Intent categories recognized by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Intent {
    /// Bare salutation such as "hello" or "namaste".
    Greeting,
    /// Mentions legal vocabulary.
    Legal,
    /// Describes a personal incident or asks what to do about one.
    Scenario,
    /// Refers back to earlier content ("explain", "clause", "summary").
    Followup,
}

/// How an intent's patterns are compared against the normalized query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    /// Whole normalized text must equal a pattern.
    Exact,
    /// Any pattern occurring anywhere in the normalized text.
    Contains,
}

impl Intent {
    /// All intents in evaluation order.
    pub const ALL: [Intent; 4] = [
        Intent::Greeting,
        Intent::Legal,
        Intent::Scenario,
        Intent::Followup,
    ];

    /// Match mode used for this intent.
    pub fn mode(self) -> MatchMode {
        match self {
            Intent::Greeting => MatchMode::Exact,
            Intent::Legal | Intent::Scenario | Intent::Followup => MatchMode::Contains,
        }
    }

    fn raw_patterns(self) -> &'static [&'static str] {
        match self {
            Intent::Greeting => GREETINGS,
            Intent::Legal => LEGAL_VOCABULARY,
            Intent::Scenario => SCENARIO_PHRASES,
            Intent::Followup => FOLLOWUP_MARKERS,
        }
    }

    /// Lowercased patterns for this intent, built once per process.
    pub fn patterns(self) -> &'static [String] {
        let compiled = compiled_patterns();
        match self {
            Intent::Greeting => &compiled[0],
            Intent::Legal => &compiled[1],
            Intent::Scenario => &compiled[2],
            Intent::Followup => &compiled[3],
        }
    }

    /// Whether the normalized query carries this intent.
    pub fn matches(self, query: &Query) -> bool {
        let text = query.normalized.as_str();
        let mut patterns = self.patterns().iter();
        match self.mode() {
            MatchMode::Exact => patterns.any(|pattern| pattern == text),
            MatchMode::Contains => patterns.any(|pattern| text.contains(pattern.as_str())),
        }
    }
}

fn compiled_patterns() -> &'static [Vec<String>; 4] {
    static COMPILED: OnceLock<[Vec<String>; 4]> = OnceLock::new();
    COMPILED.get_or_init(|| {
        Intent::ALL.map(|intent| {
            intent
                .raw_patterns()
                .iter()
                .map(|pattern| pattern.trim().to_lowercase())
                .filter(|pattern| !pattern.is_empty())
                .collect()
        })
    })
}

/// Independent boolean signals computed for one query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IntentSignals {
    /// Query is exactly a greeting.
    pub greeting: bool,
    /// Query mentions legal vocabulary.
    pub legal: bool,
    /// Query describes a personal situation.
    pub scenario: bool,
    /// Query refers back to earlier content.
    pub followup: bool,
}

/// Compute every intent signal for `query`.
pub fn classify(query: &Query) -> IntentSignals {
    IntentSignals {
        greeting: Intent::Greeting.matches(query),
        legal: Intent::Legal.matches(query),
        scenario: Intent::Scenario.matches(query),
        followup: Intent::Followup.matches(query),
    }
}

/// Exact-match greeting test on raw text.
pub fn is_greeting(text: &str) -> bool {
    Intent::Greeting.matches(&Query::new(text))
}

/// Legal vocabulary test on raw text.
pub fn is_legal(text: &str) -> bool {
    Intent::Legal.matches(&Query::new(text))
}

/// Scenario phrase test on raw text.
pub fn is_scenario(text: &str) -> bool {
    Intent::Scenario.matches(&Query::new(text))
}

/// Follow-up marker test on raw text.
pub fn is_followup(text: &str) -> bool {
    Intent::Followup.matches(&Query::new(text))
}

/// Where a chat request goes after classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatRoute {
    /// Answer with the canned greeting.
    Greet,
    /// Answer with the out-of-domain refusal.
    Refuse,
    /// Compose a prompt and call the backend.
    Backend,
}

/// Decide how to handle a chat request.
///
/// Greeting wins over everything; otherwise the request needs a legal or scenario signal to
/// reach the backend. The follow-up signal does not take part.
pub fn route_chat(signals: &IntentSignals) -> ChatRoute {
    if signals.greeting {
        ChatRoute::Greet
    } else if !(signals.legal || signals.scenario) {
        ChatRoute::Refuse
    } else {
        ChatRoute::Backend
    }
}

const GREETINGS: &[&str] = &[
    "hi",
    "hii",
    "hello",
    "hey",
    "good morning",
    "good evening",
    "good afternoon",
    "gm",
    "ge",
    "ga",
    "namaste",
    "vanakkam",
];

#[rustfmt::skip]
const LEGAL_VOCABULARY: &[&str] = &[
    // general law
    "law", "legal", "lawyer", "advocate", "attorney", "counsel",
    "lawsuit", "litigation", "jurisdiction", "appeal", "tribunal",
    "hearing", "petition", "motion", "judgment", "order", "decree",
    "injunction", "trial", "case", "case law", "precedent",
    "statute", "regulation", "compliance", "bylaw", "fine",
    "violation", "offence", "legal rights", "remedy", "legal action",
    // criminal
    "crime", "criminal", "ipc", "crpc", "arrest", "bail", "custody",
    "charge sheet", "fir", "complaint", "police", "accused",
    "witness", "evidence", "testimony", "statement", "investigation",
    "charges", "sections", "forensic", "remand", "cognizable",
    "non-cognizable", "summons", "warrant", "detention",
    "cross examination",
    // civil
    "civil", "damages", "negligence", "compensation", "tort",
    "liability", "nuisance", "defamation", "harassment",
    "injury", "loss", "suit", "cause of action",
    // contract and business
    "contract", "agreement", "breach", "lease", "mou", "nda",
    "consideration", "terms", "conditions", "indemnity", "clause",
    "liquidated damages", "purchase order", "service agreement",
    "commercial", "agency", "partnership", "llp",
    // corporate and tax
    "company", "corporate", "gst", "tax", "director", "shareholder",
    "roc", "mca", "audit", "insolvency", "bankruptcy",
    "ibc", "liquidator", "esop", "startup india", "msme",
    // property
    "property", "ownership", "eviction", "rent", "tenant",
    "landlord", "mortgage", "possession", "occupancy", "sale deed",
    "gift deed", "partition", "ancestral", "encroachment",
    "land registration", "patta", "chitta", "fmb", "mutation",
    // family
    "marriage", "divorce", "alimony", "498a", "domestic",
    "dowry", "maintenance", "child support", "guardianship",
    "family court", "adoption", "matrimonial",
    // labour and employment
    "labour", "employee", "wages", "salary", "bonus",
    "gratuity", "pf", "esi", "termination", "retrenchment",
    "posh", "sexual harassment", "workplace", "employment contract",
    // intellectual property
    "copyright", "trademark", "patent", "ip", "infringement",
    "cease and desist", "licensing", "royalty",
    // cyber
    "cyber", "privacy", "data", "dpdp", "hacking", "phishing",
    "otp fraud", "cybercrime", "it act", "misuse",
    // consumer
    "consumer", "refund", "warranty", "guarantee",
    "defective", "deficiency", "ecommerce", "consumer court",
    // documents and drafting
    "legal notice", "affidavit", "power of attorney", "poa",
    "deed", "undertaking", "will", "settlement", "loan agreement",
    "terms of service", "privacy policy", "draft", "notary",
    // court and procedure
    "court", "judge", "summon", "notice",
    "high court", "supreme court", "district court",
    "revision", "review", "stay order",
    "adjournment", "proceedings", "hearing date",
    // rights and protection
    "fundamental rights", "article", "right to information",
    "rti", "human rights", "equality", "freedom", "protection",
    "constitution", "constitutional law",
    // special acts (India)
    "motor vehicles act", "domestic violence act",
    "ni act", "138", "rtpcr", "id act", "ipc section",
    "police act", "posco", "sc/st act",
    // financial and banking
    "loan", "emi", "recover", "recovery agent", "credit",
    "bank fraud", "npas", "cibil", "insurance", "policy",
    "claim", "foreclosure", "charge",
    // real estate
    "rera", "builder", "possession delay", "flat", "apartment",
    "agreement for sale", "registration", "stamp duty",
    // miscellaneous
    "license", "permit", "penalty", "rules",
    "guidelines", "authority", "ombudsman",
];

#[rustfmt::skip]
const SCENARIO_PHRASES: &[&str] = &[
    // first person
    "i was", "i am", "i have", "my", "me", "we", "us",
    // incidents
    "harassed", "threatened", "abused", "cheated", "forced",
    "assaulted", "stalked", "blackmailed", "scammed", "robbed",
    "terminated", "evicted", "denied", "molested",
    // context
    "workplace", "office", "college", "school",
    "street", "online", "whatsapp", "instagram",
    // intent phrasing
    "what should i do", "what action can i take",
    "can i complain", "legal action", "file a case",
    "fir", "complaint", "procedure", "next steps",
];

#[rustfmt::skip]
const FOLLOWUP_MARKERS: &[&str] = &[
    "point", "clause", "explain", "meaning", "interpret",
    "summary", "more about", "what is", "who is", "why", "how",
    "section", "para", "paragraph", "line", "details", "term",
];
