use std::ffi::OsString;

pub use clap::Parser;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct ClapArgs {
    /// Form definition JSON file
    #[clap(short = 'd', long, help = "form definition (JSON)")]
    definition: String,

    /// Config file with toggles; defaults to $FORMLINE_CONFIG_PATH or ~/.formline/config
    #[clap(short = 'c', long, help = "config file (INI)")]
    config: Option<String>,

    /// Submission endpoint
    #[clap(short = 'a', long, help = "submission endpoint URL")]
    action: Option<String>,

    /// Verification endpoint used to run captcha challenges
    #[clap(long, help = "challenge endpoint URL")]
    challenge_endpoint: Option<String>,

    /// Field values to enter before submitting, as id=value
    #[clap(short = 'f', long = "fill", value_name = "ID=VALUE")]
    fill: Vec<String>,

    /// Captcha fields to challenge before submitting
    #[clap(long = "challenge", value_name = "ID")]
    challenge: Vec<String>,

    /// Print the rendered document instead of submitting
    #[clap(long, help = "print the rendered form HTML")]
    dump_html: bool,
}

#[derive(Debug, Clone)]
pub struct CommandLineArgs {
    definition: String,
    config: Option<String>,
    action: Option<String>,
    challenge_endpoint: Option<String>,
    fill: Vec<(String, String)>,
    challenge: Vec<String>,
    dump_html: bool,
}

impl CommandLineArgs {
    pub fn parse() -> Self {
        Self::from(ClapArgs::parse())
    }

    pub fn parse_from<I, T>(itr: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        Self::from(ClapArgs::parse_from(itr))
    }

    pub fn definition(&self) -> &str {
        &self.definition
    }

    pub fn config(&self) -> Option<&str> {
        self.config.as_deref()
    }

    pub fn action(&self) -> Option<&str> {
        self.action.as_deref()
    }

    pub fn challenge_endpoint(&self) -> Option<&str> {
        self.challenge_endpoint.as_deref()
    }

    pub fn fill(&self) -> &[(String, String)] {
        &self.fill
    }

    pub fn challenge(&self) -> &[String] {
        &self.challenge
    }

    pub fn dump_html(&self) -> bool {
        self.dump_html
    }
}

impl From<ClapArgs> for CommandLineArgs {
    fn from(args: ClapArgs) -> Self {
        let fill = args
            .fill
            .iter()
            .map(|pair| match pair.split_once('=') {
                Some((id, value)) => (id.trim().to_string(), value.to_string()),
                None => (pair.trim().to_string(), String::new()),
            })
            .collect();
        Self {
            definition: args.definition,
            config: args.config,
            action: args.action,
            challenge_endpoint: args.challenge_endpoint,
            fill,
            challenge: args.challenge,
            dump_html: args.dump_html,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse_args_definition_only() {
        let args = CommandLineArgs::parse_from(["program", "--definition", "form.json"]);
        assert_eq!(args.definition(), "form.json");
        assert_eq!(args.config(), None);
        assert!(args.fill().is_empty());
        assert!(!args.dump_html());
    }

    #[test]
    fn test_parse_args_short_flags() {
        let args = CommandLineArgs::parse_from([
            "program", "-d", "form.json", "-c", "cfg", "-a", "http://localhost/submit",
        ]);
        assert_eq!(args.config(), Some("cfg"));
        assert_eq!(args.action(), Some("http://localhost/submit"));
    }

    #[test]
    fn test_fill_pairs_split_on_first_equals() {
        let args = CommandLineArgs::parse_from([
            "program", "-d", "f.json", "--fill", "name=Ada", "--fill", "expr=a=b", "--fill", "empty",
        ]);
        assert_eq!(
            args.fill(),
            &[
                ("name".to_string(), "Ada".to_string()),
                ("expr".to_string(), "a=b".to_string()),
                ("empty".to_string(), String::new()),
            ]
        );
    }

    #[test]
    fn test_repeated_challenge_and_dump_html() {
        let args = CommandLineArgs::parse_from([
            "program",
            "-d",
            "f.json",
            "--challenge",
            "captcha",
            "--challenge-endpoint",
            "http://localhost/verify",
            "--dump-html",
        ]);
        assert_eq!(args.challenge(), &["captcha".to_string()]);
        assert_eq!(args.challenge_endpoint(), Some("http://localhost/verify"));
        assert!(args.dump_html());
    }
}
