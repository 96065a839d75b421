use std::fmt;

/// Non-fatal conditions noticed during a release run.
/// These are reported to the user but never stop the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub enum BoundaryWarning {
    /// The version compared against is not older than the release
    PreviousNotOlder { previous: String, current: String },
    /// The analyzer found nothing to report
    NoAnalyzedChanges { current: String },
    /// Templates changed without a matching `@version` bump
    UnbumpedTemplates { count: usize },
}

impl fmt::Display for BoundaryWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoundaryWarning::PreviousNotOlder { previous, current } => {
                write!(
                    f,
                    "Previous version '{}' is not older than '{}'",
                    previous, current
                )
            }
            BoundaryWarning::NoAnalyzedChanges { current } => {
                write!(f, "The analyzer reported no changes for {}", current)
            }
            BoundaryWarning::UnbumpedTemplates { count } => {
                let noun = if *count == 1 { "template" } else { "templates" };
                write!(
                    f,
                    "{} {} changed without a @version bump",
                    count, noun
                )
            }
        }
    }
}
