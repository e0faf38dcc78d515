//! Application constants
//!
//! Centralized location for domain-level constants and the defaults the
//! shipped extension is configured with.

// Token lifecycle
pub const DEFAULT_EXPIRY_BUFFER_SECS: i64 = 300;
pub const STATE_NONCE_BYTES: usize = 32;

// Resource cache
pub const DEFAULT_CACHE_TTL_SECS: u64 = 24 * 60 * 60;
pub const RECENTLY_USED_CAPACITY: usize = 5;

// Loopback callback page
pub const DEFAULT_CALLBACK_PORT: u16 = 8917;
pub const DEFAULT_CALLBACK_PATH: &str = "/oauth/callback";
pub const DEFAULT_AUTHORIZE_TIMEOUT_SECS: u64 = 300;

// Proxy that holds the client secrets
pub const DEFAULT_PROXY_URL: &str = "https://duly-noted-auth.agentstarter.workers.dev";

// GitHub
pub const GITHUB_CLIENT_ID: &str = "7113cf472be91f945d03";
pub const GITHUB_AUTH_URL: &str = "https://github.com/login/oauth/authorize";
pub const GITHUB_TOKEN_URL: &str = "https://github.com/login/oauth/access_token";
pub const GITHUB_API_URL: &str = "https://api.github.com";
pub const GITHUB_SCOPES: &[&str] = &["repo", "project", "read:user"];
pub const GITHUB_ACCEPT: &str = "application/vnd.github.v3+json";

// Notion
pub const NOTION_CLIENT_ID: &str = "307d872b-594c-80ef-ae04-0037a61b9472";
pub const NOTION_AUTH_URL: &str = "https://api.notion.com/v1/oauth/authorize";
pub const NOTION_TOKEN_URL: &str = "https://api.notion.com/v1/oauth/token";
pub const NOTION_API_URL: &str = "https://api.notion.com/v1";
pub const NOTION_VERSION: &str = "2022-06-28";

pub const USER_AGENT: &str = "DulyNoted/0.1";
