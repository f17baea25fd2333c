//! Expression resolution command

use clap::Args;
use skewbridge_core::transform::ExpressionSnapshot;

#[derive(Debug, Args)]
pub struct ResolveArgs {
    /// Expression to resolve, e.g. '${jboss.bind.address:127.0.0.1}'
    pub expression: String,

    /// System property visible to the expression, as key=value
    #[arg(short = 'D', value_parser = parse_property)]
    pub properties: Vec<(String, String)>,
}

fn parse_property(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected key=value, got '{}'", raw)),
    }
}

pub fn execute(args: ResolveArgs) -> Result<(), Box<dyn std::error::Error>> {
    let snapshot = args
        .properties
        .into_iter()
        .fold(ExpressionSnapshot::capture(), |snapshot, (key, value)| {
            snapshot.with_property(key, value)
        });

    println!("{}", snapshot.resolve_string(&args.expression)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_property_splits_on_first_equals() {
        assert_eq!(
            parse_property("a=b=c").unwrap(),
            ("a".to_string(), "b=c".to_string())
        );
        assert!(parse_property("=x").is_err());
        assert!(parse_property("novalue").is_err());
    }
}
