use super::{deduct, DetectionContext, Detector};
use aho_corasick::AhoCorasick;
use async_trait::async_trait;
use autoguard_domain::{DetectorOutcome, DomainError, Layer, VisitRequest};
use fancy_regex::Regex;
use serde_json::json;

const MIN_UA_LEN: usize = 10;

const DEDUCT_CRAWLER: i32 = 50;
const DEDUCT_HEADLESS: i32 = 50;
const DEDUCT_SUSPICIOUS: i32 = 15;
const DEDUCT_OUTDATED: i32 = 20;

/// Self-identifying bots. Matched case-insensitively anywhere in the UA.
const KNOWN_BOTS: &[&str] = &[
    "googlebot",
    "adsbot-google",
    "bingbot",
    "yandexbot",
    "baiduspider",
    "duckduckbot",
    "slurp",
    "applebot",
    "facebookexternalhit",
    "ia_archiver",
    "semrushbot",
    "ahrefsbot",
    "mj12bot",
    "dotbot",
    "petalbot",
    "bytespider",
    "gptbot",
    "ccbot",
    "amazonbot",
];

/// Generic fetch-library and crawler vocabulary.
const CRAWLER_TERMS: &[&str] = &[
    "crawler",
    "spider",
    "scraper",
    "scrapy",
    "curl/",
    "wget/",
    "python-requests",
    "python-urllib",
    "go-http-client",
    "okhttp",
    "httpclient",
    "libwww",
    "aiohttp",
];

/// Browser-automation fingerprints.
const HEADLESS_TERMS: &[&str] = &[
    "headless",
    "phantomjs",
    "slimerjs",
    "htmlunit",
    "selenium",
    "webdriver",
    "puppeteer",
    "playwright",
    "chrome-lighthouse",
    "electron",
];

/// Shapes that rarely occur in organic desktop/mobile traffic.
const SUSPICIOUS_PATTERNS: &[&str] = &[
    r"^Mozilla/\d\.\d+$",
    r"^[A-Za-z0-9._-]+/[\d.]+$",
    r"(?i)windows nt 5\.",
    r"(?i)msie [2-8]\.",
];

/// Versions below these are treated as outdated for scoring.
const MIN_CHROME: u32 = 90;
const MIN_FIREFOX: u32 = 91;
const MIN_EDGE: u32 = 90;
const MIN_SAFARI: u32 = 14;

#[derive(Debug, Default, PartialEq, Eq)]
pub struct UaProfile {
    pub browser: Option<&'static str>,
    pub version: Option<u32>,
    pub os: Option<&'static str>,
    pub mobile: bool,
}

/// Extract browser family, major version, OS and mobile flag. Best-effort:
/// anything unrecognized stays `None`.
pub fn parse_user_agent(ua: &str) -> UaProfile {
    let mut profile = UaProfile::default();

    // Order matters: Edge and Opera embed a Chrome token.
    let families: &[(&str, &str)] = &[
        ("Edg/", "Edge"),
        ("OPR/", "Opera"),
        ("Chrome/", "Chrome"),
        ("Firefox/", "Firefox"),
        ("Version/", "Safari"),
    ];
    for &(token, name) in families {
        if let Some(idx) = ua.find(token) {
            if name == "Safari" && !ua.contains("Safari/") {
                continue;
            }
            profile.browser = Some(name);
            profile.version = major_version(&ua[idx + token.len()..]);
            break;
        }
    }

    profile.os = if ua.contains("Windows NT") {
        Some("Windows")
    } else if ua.contains("Android") {
        Some("Android")
    } else if ua.contains("iPhone") || ua.contains("iPad") {
        Some("iOS")
    } else if ua.contains("Mac OS X") {
        Some("macOS")
    } else if ua.contains("Linux") {
        Some("Linux")
    } else {
        None
    };

    profile.mobile =
        ua.contains("Mobile") || ua.contains("Android") || ua.contains("iPhone");

    profile
}

fn major_version(rest: &str) -> Option<u32> {
    let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
    digits.parse().ok()
}

fn is_outdated(profile: &UaProfile) -> bool {
    match (profile.browser, profile.version) {
        (Some("Chrome"), Some(v)) => v < MIN_CHROME,
        (Some("Firefox"), Some(v)) => v < MIN_FIREFOX,
        (Some("Edge"), Some(v)) => v < MIN_EDGE,
        (Some("Safari"), Some(v)) => v < MIN_SAFARI,
        _ => false,
    }
}

/// L4 — user-agent analysis.
pub struct UserAgentDetector {
    bots: AhoCorasick,
    crawlers: AhoCorasick,
    headless: AhoCorasick,
    suspicious: Vec<Regex>,
}

impl UserAgentDetector {
    pub fn new() -> Self {
        let build = |terms: &[&str]| {
            AhoCorasick::builder()
                .ascii_case_insensitive(true)
                .build(terms)
                .expect("static keyword set compiles")
        };
        Self {
            bots: build(KNOWN_BOTS),
            crawlers: build(CRAWLER_TERMS),
            headless: build(HEADLESS_TERMS),
            suspicious: SUSPICIOUS_PATTERNS
                .iter()
                .filter_map(|p| Regex::new(p).ok())
                .collect(),
        }
    }

    fn first_match(matcher: &AhoCorasick, haystack: &str, terms: &[&str]) -> Option<String> {
        matcher
            .find(haystack)
            .map(|m| terms[m.pattern().as_usize()].to_string())
    }
}

impl Default for UserAgentDetector {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Detector for UserAgentDetector {
    fn layer(&self) -> Layer {
        Layer::L4
    }

    async fn detect(
        &self,
        request: &VisitRequest,
        ctx: &DetectionContext,
    ) -> Result<DetectorOutcome, DomainError> {
        let ua = request.user_agent.trim();

        if ua.len() <= MIN_UA_LEN {
            return Ok(DetectorOutcome::fail("missing or truncated user agent")
                .with_evidence(json!({ "userAgentLength": ua.len() })));
        }

        let profile = parse_user_agent(ua);

        if let Some(bot) = Self::first_match(&self.bots, ua, KNOWN_BOTS) {
            if ctx.policy.block_known_bots {
                return Ok(DetectorOutcome::fail(format!("known bot: {bot}"))
                    .with_evidence(json!({ "botKeyword": bot })));
            }
        }

        let mut score: i32 = 100;
        let mut reasons: Vec<String> = Vec::new();

        let crawler = Self::first_match(&self.crawlers, ua, CRAWLER_TERMS);
        if let Some(term) = &crawler {
            deduct(&mut score, DEDUCT_CRAWLER);
            reasons.push(format!("crawler term '{term}'"));
        }

        let automation = Self::first_match(&self.headless, ua, HEADLESS_TERMS);
        if let Some(term) = &automation {
            deduct(&mut score, DEDUCT_HEADLESS);
            reasons.push(format!("automation term '{term}'"));
        }

        let mut suspicious_matches = 0;
        for regex in &self.suspicious {
            if regex.is_match(ua).unwrap_or(false) {
                suspicious_matches += 1;
                deduct(&mut score, DEDUCT_SUSPICIOUS);
            }
        }
        if suspicious_matches > 0 {
            reasons.push(format!("{suspicious_matches} suspicious pattern(s)"));
        }

        let outdated = is_outdated(&profile);
        if outdated {
            deduct(&mut score, DEDUCT_OUTDATED);
            reasons.push("outdated browser version".to_string());
        }

        let evidence = json!({
            "browser": profile.browser,
            "browserVersion": profile.version,
            "os": profile.os,
            "mobile": profile.mobile,
            "crawlerTerm": crawler,
            "automationTerm": automation,
            "suspiciousMatches": suspicious_matches,
            "outdated": outdated,
        });

        let score = score.clamp(0, 100) as u8;
        let outcome = if score == 0 {
            DetectorOutcome::fail(reasons.join("; "))
        } else if reasons.is_empty() {
            DetectorOutcome::pass(score)
        } else {
            DetectorOutcome::pass(score).with_reason(reasons.join("; "))
        };
        Ok(outcome.with_evidence(evidence))
    }
}
