//! Robots.txt parser implementation
//!
//! Allow/disallow matching is delegated to the robotstxt crate. Crawl-delay and
//! Sitemap lines are not exposed by its matcher, so they are read here.

use robotstxt::DefaultMatcher;

/// One `User-agent` group and the crawl delay declared inside it
#[derive(Debug, Clone, PartialEq)]
struct AgentGroup {
    /// Lowercased agent names of the group
    agents: Vec<String>,
    crawl_delay: Option<f64>,
}

/// Parsed robots.txt data
#[derive(Debug, Clone)]
pub struct ParsedRobots {
    /// Raw robots.txt content
    content: String,
    groups: Vec<AgentGroup>,
    sitemaps: Vec<String>,
}

impl ParsedRobots {
    /// Parses raw robots.txt content
    ///
    /// Lines that are not directives are ignored, so arbitrary text parses into
    /// a file that allows everything.
    pub fn from_content(content: &str) -> Self {
        let mut groups: Vec<AgentGroup> = Vec::new();
        let mut sitemaps = Vec::new();
        // True once the current group has seen a rule; the next User-agent starts a new group
        let mut in_rules = true;

        for line in content.lines() {
            let line = match line.split_once('#') {
                Some((before, _)) => before,
                None => line,
            }
            .trim();

            let Some((key, value)) = line.split_once(':') else {
                continue;
            };
            let key = key.trim().to_lowercase();
            let value = value.trim();

            match key.as_str() {
                "user-agent" => {
                    if in_rules || groups.is_empty() {
                        groups.push(AgentGroup {
                            agents: Vec::new(),
                            crawl_delay: None,
                        });
                        in_rules = false;
                    }
                    if let Some(group) = groups.last_mut() {
                        group.agents.push(value.to_lowercase());
                    }
                }
                "crawl-delay" => {
                    in_rules = true;
                    let delay = value.parse::<f64>().ok().filter(|d| d.is_finite() && *d >= 0.0);
                    if let (Some(group), Some(delay)) = (groups.last_mut(), delay) {
                        group.crawl_delay.get_or_insert(delay);
                    }
                }
                "allow" | "disallow" => in_rules = true,
                "sitemap" if !value.is_empty() => sitemaps.push(value.to_string()),
                _ => {}
            }
        }

        Self {
            content: content.to_string(),
            groups,
            sitemaps,
        }
    }

    /// Returns the raw robots.txt content
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Checks if a full URL is allowed for the given user agent
    ///
    /// Only the product token of `user_agent` is matched against the groups.
    pub fn is_allowed(&self, url: &str, user_agent: &str) -> bool {
        if self.content.trim().is_empty() {
            return true;
        }

        let mut matcher = DefaultMatcher::default();
        matcher.one_agent_allowed_by_robots(&self.content, product_token(user_agent), url)
    }

    /// Gets the crawl delay that applies to `user_agent`
    ///
    /// The first group naming our agent wins; otherwise the `*` group is used.
    pub fn crawl_delay(&self, user_agent: &str) -> Option<f64> {
        let token = product_token(user_agent).to_lowercase();

        let specific = self.groups.iter().find_map(|group| {
            let named = group
                .agents
                .iter()
                .any(|agent| agent != "*" && !agent.is_empty() && token.contains(agent.as_str()));
            if named {
                group.crawl_delay
            } else {
                None
            }
        });

        specific.or_else(|| {
            self.groups
                .iter()
                .filter(|group| group.agents.iter().any(|agent| agent == "*"))
                .find_map(|group| group.crawl_delay)
        })
    }

    /// Sitemap URLs in file order
    pub fn sitemaps(&self) -> &[String] {
        &self.sitemaps
    }
}

/// Returns the product token of a User-Agent header
///
/// This is the text before the first `/` or whitespace, e.g. `AttuarioAI` for
/// `AttuarioAI/0.1 (+https://github.com)`.
pub fn product_token(user_agent: &str) -> &str {
    let trimmed = user_agent.trim();
    let end = trimmed
        .find(|c: char| c == '/' || c.is_whitespace())
        .unwrap_or(trimmed.len());
    &trimmed[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://example.com";

    fn allowed(robots: &ParsedRobots, path: &str, agent: &str) -> bool {
        robots.is_allowed(&format!("{}{}", BASE, path), agent)
    }

    #[test]
    fn test_product_token() {
        assert_eq!(product_token("AttuarioAI/0.1 (+https://github.com)"), "AttuarioAI");
        assert_eq!(product_token("TestBot"), "TestBot");
        assert_eq!(product_token("My Bot/2"), "My");
        assert_eq!(product_token(""), "");
    }

    #[test]
    fn test_parse_disallow_all() {
        let robots = ParsedRobots::from_content("User-agent: *\nDisallow: /");
        assert!(!allowed(&robots, "/", "TestBot"));
        assert!(!allowed(&robots, "/page", "TestBot"));
    }

    #[test]
    fn test_parse_disallow_specific() {
        let robots = ParsedRobots::from_content("User-agent: *\nDisallow: /admin");
        assert!(allowed(&robots, "/", "TestBot"));
        assert!(allowed(&robots, "/page", "TestBot"));
        assert!(!allowed(&robots, "/admin", "TestBot"));
        assert!(!allowed(&robots, "/admin/users", "TestBot"));
    }

    #[test]
    fn test_parse_allow_and_disallow() {
        let robots =
            ParsedRobots::from_content("User-agent: *\nDisallow: /private\nAllow: /private/public");
        assert!(!allowed(&robots, "/private", "TestBot"));
        assert!(allowed(&robots, "/private/public", "TestBot"));
    }

    #[test]
    fn test_specific_user_agent_uses_product_token() {
        let content = "User-agent: BadBot\nDisallow: /\n\nUser-agent: *\nAllow: /";
        let robots = ParsedRobots::from_content(content);
        assert!(allowed(&robots, "/page", "GoodBot/1.0"));
        assert!(!allowed(&robots, "/page", "BadBot/2.1 (+https://bad.example)"));
    }

    #[test]
    fn test_non_directive_text_allows_everything() {
        let robots = ParsedRobots::from_content("This is not valid robots.txt {{{");
        assert!(allowed(&robots, "/any/path", "TestBot"));
        assert_eq!(robots.crawl_delay("TestBot"), None);
    }

    #[test]
    fn test_empty_robots_txt() {
        let robots = ParsedRobots::from_content("");
        assert!(allowed(&robots, "/any/path", "TestBot"));
    }

    #[test]
    fn test_crawl_delay_wildcard() {
        let robots = ParsedRobots::from_content("User-agent: *\nCrawl-delay: 10\nDisallow: /admin");
        assert_eq!(robots.crawl_delay("TestBot"), Some(10.0));
        assert_eq!(robots.crawl_delay("AnyBot"), Some(10.0));
    }

    #[test]
    fn test_crawl_delay_specific_agent() {
        let content = "User-agent: TestBot\nCrawl-delay: 5\n\nUser-agent: *\nCrawl-delay: 10";
        let robots = ParsedRobots::from_content(content);
        assert_eq!(robots.crawl_delay("TestBot/1.0"), Some(5.0));
        assert_eq!(robots.crawl_delay("OtherBot"), Some(10.0));
    }

    #[test]
    fn test_crawl_delay_after_rules_in_same_group() {
        let content =
            "User-agent: TestBot\nDisallow: /tmp\nCrawl-delay: 4\n\nUser-agent: *\nDisallow:";
        let robots = ParsedRobots::from_content(content);
        assert_eq!(robots.crawl_delay("TestBot"), Some(4.0));
        assert_eq!(robots.crawl_delay("OtherBot"), None);
    }

    #[test]
    fn test_crawl_delay_does_not_leak_into_next_group() {
        let content = "User-agent: *\nCrawl-delay: 2\nUser-agent: SlowBot\nCrawl-delay: 30";
        let robots = ParsedRobots::from_content(content);
        assert_eq!(robots.crawl_delay("OtherBot"), Some(2.0));
        assert_eq!(robots.crawl_delay("SlowBot"), Some(30.0));
    }

    #[test]
    fn test_crawl_delay_decimal_and_invalid() {
        let robots = ParsedRobots::from_content("User-agent: *\nCrawl-delay: 2.5");
        assert_eq!(robots.crawl_delay("TestBot"), Some(2.5));

        let robots = ParsedRobots::from_content("User-agent: *\nCrawl-delay: soon");
        assert_eq!(robots.crawl_delay("TestBot"), None);
    }

    #[test]
    fn test_crawl_delay_case_insensitive() {
        let robots = ParsedRobots::from_content("User-agent: TestBot\ncrawl-delay: 7");
        assert_eq!(robots.crawl_delay("testbot"), Some(7.0));
        assert_eq!(robots.crawl_delay("TESTBOT"), Some(7.0));
    }

    #[test]
    fn test_crawl_delay_multiple_user_agents() {
        let robots =
            ParsedRobots::from_content("User-agent: BotA\nUser-agent: BotB\nCrawl-delay: 3");
        assert_eq!(robots.crawl_delay("BotA"), Some(3.0));
        assert_eq!(robots.crawl_delay("BotB"), Some(3.0));
        assert_eq!(robots.crawl_delay("BotC"), None);
    }

    #[test]
    fn test_sitemaps_in_file_order() {
        let content = "Sitemap: https://example.com/a.xml\n\
                       User-agent: *\nDisallow: /x\n# comment\n\
                       Sitemap: https://example.com/b.xml";
        let robots = ParsedRobots::from_content(content);
        assert_eq!(
            robots.sitemaps(),
            &[
                "https://example.com/a.xml".to_string(),
                "https://example.com/b.xml".to_string()
            ]
        );
    }
}
