//! Constants shared across the engine

/// Default delimiter tokens: block_start block_close line_start inline_start inline_end
pub const DEFAULT_SYNTAX: &str = "<% %> % {{ }}";

/// Name of the configuration file
pub const CONFIG_FILE: &str = "stpl.toml";

/// Template name used when none is supplied
pub const ANONYMOUS_TEMPLATE: &str = "<string>";

/// Generated code
pub mod codegen {
    /// One indentation unit in generated code
    pub const INDENT_UNIT: &str = "  ";

    /// Emission call written for every flushed literal span
    pub const PRINTLIST: &str = "_printlist";

    /// Converter wrapped around escaped inline expressions
    pub const ESCAPE_FN: &str = "_escape";

    /// Converter wrapped around raw inline expressions
    pub const STR_FN: &str = "_str";

    /// Prefix of an inline expression that skips escaping
    pub const UNESCAPE_SIGIL: char = '!';
}

/// Execution limits
pub mod limits {
    /// Nested `include` calls allowed before the render fails
    pub const MAX_INCLUDE_DEPTH: usize = 32;

    /// Upper bound on `range()` length
    pub const MAX_RANGE_LEN: i64 = 10_000_000;

    /// Upper bound on the length of a repeated or padded value
    pub const MAX_REPEAT_LEN: usize = 64 * 1024 * 1024;

    /// Nested brackets, unary operators or blocks allowed in one template
    pub const MAX_NESTING_DEPTH: usize = 64;

    /// Binary operators or postfix accesses chained in one expression
    pub const MAX_OPERATOR_CHAIN: usize = 256;
}

/// Host collaborator defaults
pub mod host {
    /// Directory templates are read from
    pub const TEMPLATE_ROOT: &str = "templates";

    /// Base URL prefixed to `local_http_get` URIs
    pub const LOCAL_BASE_URL: &str = "http://127.0.0.1:3000";

    /// Timeout for HTTP fetches, in seconds
    pub const HTTP_TIMEOUT_SECS: u64 = 3;
}
