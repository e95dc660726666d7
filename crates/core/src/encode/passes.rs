//! Expansion of a base command into per-pass commands.

use super::command::Command;
use super::error::EncodeError;

/// One encoder run of a job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pass {
    /// 1-based pass index.
    pub index: u32,
    /// Total passes of the job.
    pub total: u32,
    pub command: Command,
}

/// Checks that a format asks for at least one pass.
pub fn validate_pass_count(pass_count: i32) -> Result<u32, EncodeError> {
    u32::try_from(pass_count)
        .ok()
        .filter(|n| *n >= 1)
        .ok_or_else(|| {
            EncodeError::configuration(format!(
                "Pass count must be a positive value, got {}",
                pass_count
            ))
        })
}

/// Produces one command per pass from `base`.
///
/// With more than one pass, every command carries the pass index and the
/// shared `log_prefix` so later passes can read the statistics of earlier
/// ones. The output path is always the last argument.
pub fn expand_passes(
    base: &Command,
    pass_count: i32,
    output: &str,
    log_prefix: &str,
) -> Result<Vec<Pass>, EncodeError> {
    let total = validate_pass_count(pass_count)?;

    let passes = (1..=total)
        .map(|index| {
            let mut command = base.clone();
            if total > 1 {
                command
                    .push("-pass")
                    .push(index)
                    .push("-passlogfile")
                    .push(log_prefix);
            }
            command.push(output);

            Pass {
                index,
                total,
                command,
            }
        })
        .collect();

    Ok(passes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encode::Arg;

    fn base() -> Command {
        Command::from(vec![
            Arg::from("-y"),
            Arg::from("-i"),
            Arg::from("/in.mkv"),
            Arg::from("-vcodec"),
            Arg::from("libx264"),
        ])
    }

    #[test]
    fn test_each_pass_ends_with_output() {
        for n in 1..=5 {
            let passes = expand_passes(&base(), n, "/tmp/out.mp4", "/scratch/pass-x").unwrap();
            assert_eq!(passes.len(), n as usize);
            for pass in &passes {
                assert_eq!(pass.command.last(), Some(&Arg::from("/tmp/out.mp4")));
                assert_eq!(pass.total, n as u32);
            }
        }
    }

    #[test]
    fn test_single_pass_has_no_pass_flags() {
        let passes = expand_passes(&base(), 1, "/tmp/out.mp4", "/scratch/pass-x").unwrap();
        let command = &passes[0].command;

        assert!(!command.contains("-pass"));
        assert!(!command.contains("-passlogfile"));
        assert_eq!(command.len(), base().len() + 1);
    }

    #[test]
    fn test_multi_pass_shares_log_prefix() {
        let passes = expand_passes(&base(), 3, "/tmp/out.mp4", "/scratch/pass-x").unwrap();

        let indices: Vec<i64> = passes
            .iter()
            .map(|p| p.command.value_of("-pass").and_then(Arg::as_int).unwrap())
            .collect();
        assert_eq!(indices, vec![1, 2, 3]);

        for pass in &passes {
            assert_eq!(
                pass.command.value_of("-passlogfile"),
                Some(&Arg::from("/scratch/pass-x"))
            );
            let flags = pass.command.position("-pass").unwrap();
            let output = pass.command.len() - 1;
            assert!(flags < output);
        }
    }

    #[test]
    fn test_base_is_not_shared() {
        let base = base();
        let passes = expand_passes(&base, 2, "/tmp/out.mp4", "/scratch/pass-x").unwrap();
        assert_eq!(base.len(), 5);
        assert_ne!(passes[0].command, passes[1].command);
    }

    #[test]
    fn test_non_positive_pass_count_is_configuration_error() {
        for n in [0, -1, i32::MIN] {
            let err = expand_passes(&base(), n, "/tmp/out.mp4", "/scratch/pass-x").unwrap_err();
            assert!(err.is_configuration());
        }
        assert!(validate_pass_count(0).is_err());
        assert_eq!(validate_pass_count(2).unwrap(), 2);
    }
}
