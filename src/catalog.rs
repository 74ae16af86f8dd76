//! Pattern catalogs used by the extractors.
//!
//! User-agent catalogs are ordered lists scanned first-match-wins. The order is
//! most specific to least specific, but only determinism is relied upon.

use regex::Regex;
use std::sync::LazyLock;

/// User-agent fragments of LLM-based agents, coding assistants and agent frameworks.
const AI_AGENT_SOURCES: &[&str] = &[
    // Vendor crawlers and fetchers
    r"claudebot",
    r"claude-user",
    r"claude-web",
    r"anthropic-ai",
    r"chatgpt-user",
    r"gptbot",
    r"oai-searchbot",
    r"perplexitybot",
    r"perplexity-user",
    r"cohere-ai",
    r"google-extended",
    r"mistralai-user",
    // Product names
    r"claude",
    r"anthropic",
    r"openai",
    r"chatgpt",
    r"gpt-[0-9]",
    r"copilot",
    r"cursor/",
    r"codeium",
    r"tabnine",
    r"devin",
    // Agent frameworks
    r"auto-?gpt",
    r"babyagi",
    r"agentgpt",
    r"langchain",
    r"llama-?index",
    r"crewai",
    r"autogen",
    r"semantic-kernel",
    // Generic phrases
    r"ai-agent",
    r"llm-agent",
    r"ai[ _-]?assistant",
];

/// User-agent fragments of CLI clients, HTTP libraries, browser automation and crawlers.
const AUTOMATION_SOURCES: &[&str] = &[
    // Command-line clients
    r"curl/",
    r"wget/",
    r"httpie",
    r"postmanruntime",
    r"insomnia",
    // Language HTTP libraries
    r"python-requests",
    r"python-urllib",
    r"python-httpx",
    r"aiohttp",
    r"go-http-client",
    r"java/",
    r"apache-httpclient",
    r"okhttp",
    r"axios",
    r"node-fetch",
    r"undici",
    r"libwww-perl",
    r"ruby",
    r"guzzlehttp",
    r"reqwest",
    // Browser automation
    r"headlesschrome",
    r"phantomjs",
    r"puppeteer",
    r"playwright",
    r"selenium",
    r"webdriver",
    r"cypress",
    // Search-engine crawlers
    r"googlebot",
    r"bingbot",
    r"yandexbot",
    r"baiduspider",
    r"duckduckbot",
    r"slurp",
    // Generic tokens
    r"bot",
    r"crawler",
    r"spider",
    r"scraper",
];

/// Headers that real browsers send on navigation requests.
pub const BROWSER_HEADERS: &[&str] = &[
    "accept",
    "accept-language",
    "accept-encoding",
    "sec-fetch-site",
    "sec-fetch-mode",
    "sec-fetch-dest",
    "sec-fetch-user",
    "sec-ch-ua",
    "sec-ch-ua-mobile",
    "sec-ch-ua-platform",
];

/// Header-name fragments associated with AI-agent tooling.
///
/// `authorization` is included because bearer tokens correlate with programmatic callers.
pub const AI_HEADER_PREFIXES: &[&str] = &[
    "x-claude",
    "x-anthropic",
    "anthropic-",
    "x-openai",
    "openai-",
    "x-ai-agent",
    "x-agent-",
    "x-llm",
    "x-gpt",
    "x-mcp",
    "mcp-session",
    "authorization",
];

/// AI-agent user-agent catalog.
pub static AI_AGENT_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| compile(AI_AGENT_SOURCES));

/// Automation user-agent catalog.
pub static AUTOMATION_PATTERNS: LazyLock<Vec<Regex>> =
    LazyLock::new(|| compile(AUTOMATION_SOURCES));

fn compile(sources: &[&str]) -> Vec<Regex> {
    sources
        .iter()
        .map(|s| Regex::new(&format!("(?i){s}")).unwrap())
        .collect()
}

/// Returns the first pattern in `catalog` that matches `text`.
pub fn first_match<'a>(catalog: &'a [Regex], text: &str) -> Option<&'a Regex> {
    catalog.iter().find(|pattern| pattern.is_match(text))
}

/// Returns the first AI header fragment contained in the lower-cased header name.
pub fn ai_header_prefix(header_name: &str) -> Option<&'static str> {
    let lower = header_name.to_ascii_lowercase();
    AI_HEADER_PREFIXES
        .iter()
        .copied()
        .find(|prefix| lower.starts_with(prefix) || lower.contains(prefix))
}
