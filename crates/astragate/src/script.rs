use std::fmt;
use std::str::FromStr;

/// One user or recognizer event replayed against a gate by `astragate run`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Listen,
    Stop,
    Say(String),
    Fail(String),
    Override,
    ClearOverride,
    Confirm,
    Cancel,
    Expire,
}

impl FromStr for Step {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(text) = s.strip_prefix("say:") {
            return Ok(Step::Say(text.to_string()));
        }
        if let Some(reason) = s.strip_prefix("fail:") {
            return Ok(Step::Fail(reason.to_string()));
        }
        match s.trim() {
            "listen" => Ok(Step::Listen),
            "stop" => Ok(Step::Stop),
            "override" => Ok(Step::Override),
            "clear-override" => Ok(Step::ClearOverride),
            "confirm" => Ok(Step::Confirm),
            "cancel" => Ok(Step::Cancel),
            "expire" => Ok(Step::Expire),
            other => Err(format!(
                "unknown step \"{other}\". expected: listen, stop, say:<text>, fail:<reason>, \
                 override, clear-override, confirm, cancel, expire"
            )),
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Listen => f.write_str("listen"),
            Step::Stop => f.write_str("stop"),
            Step::Say(text) => write!(f, "say:{text}"),
            Step::Fail(reason) => write!(f, "fail:{reason}"),
            Step::Override => f.write_str("override"),
            Step::ClearOverride => f.write_str("clear-override"),
            Step::Confirm => f.write_str("confirm"),
            Step::Cancel => f.write_str("cancel"),
            Step::Expire => f.write_str("expire"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_payload_steps() {
        assert_eq!(
            "say:Yes, execute".parse::<Step>().unwrap(),
            Step::Say("Yes, execute".into())
        );
        assert_eq!(
            "fail:mic denied".parse::<Step>().unwrap(),
            Step::Fail("mic denied".into())
        );
    }

    #[test]
    fn parses_bare_steps() {
        assert_eq!("listen".parse::<Step>().unwrap(), Step::Listen);
        assert_eq!("stop".parse::<Step>().unwrap(), Step::Stop);
        assert_eq!("clear-override".parse::<Step>().unwrap(), Step::ClearOverride);
        assert_eq!("expire".parse::<Step>().unwrap(), Step::Expire);
    }

    #[test]
    fn rejects_unknown() {
        let err = "shout".parse::<Step>().unwrap_err();
        assert!(err.contains("unknown step"));
    }

    #[test]
    fn display_matches_input() {
        for s in ["listen", "stop", "say:yes", "fail:x", "override", "confirm", "cancel"] {
            assert_eq!(s.parse::<Step>().unwrap().to_string(), s);
        }
    }
}
