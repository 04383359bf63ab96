#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Returned when fewer than one recommendation is requested per batch.
    #[error("invalid batch size: at least one recommendation must be requested per batch, got {batch_size}")]
    InvalidBatchSize {
        /// The requested batch size.
        batch_size: usize,
    },

    /// Returned when a constraint or validation step references a column
    /// that is not present in the given table.
    #[error("column '{column}' not found in the given data")]
    MissingColumn {
        /// The name of the missing column.
        column: String,
    },

    /// Returned when a target column contains missing values.
    #[error("the target '{target}' has missing values; missing target values are not supported")]
    MissingTargetValues {
        /// The name of the affected target.
        target: String,
    },

    /// Returned when a target column contains non-numeric entries.
    #[error("the target '{target}' has non-numeric entries; non-numeric target values are not supported")]
    NonNumericTarget {
        /// The name of the affected target.
        target: String,
    },

    /// Returned when a parameter column contains missing values.
    #[error(
        "the parameter '{parameter}' has missing values; missing parameter values are not supported"
    )]
    MissingParameterValues {
        /// The name of the affected parameter.
        parameter: String,
    },

    /// Returned when a numerical parameter column contains non-numeric entries.
    #[error("the numerical parameter '{parameter}' has non-numeric entries")]
    NonNumericParameter {
        /// The name of the affected parameter.
        parameter: String,
    },

    /// Returned when a parameter list contains the same name more than once.
    #[error("parameter lists must have unique entries, but '{parameter}' appears more than once")]
    DuplicateParameters {
        /// The first duplicated parameter name.
        parameter: String,
    },

    /// Returned when an exclusion constraint is built without conditions.
    #[error("an exclusion constraint requires at least one condition")]
    EmptyConditions,

    /// Returned when a parameter is built without any values.
    #[error("the parameter '{parameter}' must have at least one value")]
    EmptyParameterValues {
        /// The name of the affected parameter.
        parameter: String,
    },

    /// Returned when a threshold operator string is not one of the
    /// supported comparison operators.
    #[error("unknown threshold operator '{operator}' (expected one of <, <=, =, ==, !=, >, >=)")]
    UnknownOperator {
        /// The rejected operator string.
        operator: String,
    },

    /// Returned when a parameter definition is invalid.
    #[error("invalid parameter '{parameter}': {reason}")]
    InvalidParameter {
        /// The name of the affected parameter.
        parameter: String,
        /// The reason the definition was rejected.
        reason: String,
    },

    /// Returned when a Pareto objective is built from fewer than two targets.
    #[error("a Pareto objective requires at least two targets, got {got}")]
    TooFewParetoTargets {
        /// The number of targets provided.
        got: usize,
    },

    /// Returned when an objective contains two targets with the same name.
    #[error("objective targets must have unique names, but '{name}' appears more than once")]
    DuplicateTargetNames {
        /// The duplicated target name.
        name: String,
    },

    /// Returned when a match-mode target is missing bounds or its bounds
    /// are not a proper interval.
    #[error("the target '{target}' requires finite bounds with lower < upper")]
    InvalidTargetBounds {
        /// The name of the affected target.
        target: String,
    },

    /// Returned when a sequential meta recommender is built from an empty
    /// recommender sequence.
    #[error("a sequential meta recommender requires at least one recommender")]
    EmptyRecommenderSequence,

    /// Returned when a search space is built without any parameters.
    #[error("a search space requires at least one parameter")]
    EmptySearchSpace,

    /// Returned when the number of measurements decreased between
    /// successive calls on the same meta recommender.
    ///
    /// This is a usage error, not a transient condition: the measurement
    /// history of a campaign is append-only, so a shrinking count means
    /// the meta recommender was not used as intended.
    #[error(
        "the number of measurements decreased from {last} to {current} since the last call; meta recommenders require a non-decreasing measurement history"
    )]
    DatasetShrank {
        /// The measurement count observed at the last call.
        last: usize,
        /// The measurement count observed now.
        current: usize,
    },

    /// Returned when a recommender sequence is exhausted.
    ///
    /// This is a distinguished condition: callers may match on it to decide
    /// whether to supply additional recommenders. See
    /// [`is_no_recommenders_left`](Error::is_no_recommenders_left).
    #[error(
        "no recommenders left: a total of {requested} recommender(s) was requested but only {available} was/were provided"
    )]
    NoRecommendersLeft {
        /// How many recommenders have been requested in total.
        requested: usize,
        /// How many recommenders the sequence provided.
        available: usize,
    },

    /// Returned when attempting to serialize an object that has no
    /// serializable identity (e.g. a streaming meta recommender whose
    /// lazy source cannot be replayed).
    #[error("{type_name} cannot be serialized")]
    NotSerializable {
        /// The name of the non-serializable type.
        type_name: String,
    },

    /// Returned when a recommender is asked for more candidates than the
    /// search space contains.
    #[error("cannot recommend {requested} candidates: only {available} available in the search space")]
    InsufficientCandidates {
        /// The requested batch size.
        requested: usize,
        /// The number of available candidates.
        available: usize,
    },

    /// Returned when a row or column of the wrong length is pushed into a table.
    #[error("length mismatch: expected {expected} values, got {got}")]
    ColumnLengthMismatch {
        /// The expected number of values.
        expected: usize,
        /// The actual number of values.
        got: usize,
    },

    /// Returned when a configuration document cannot be parsed.
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),

    /// Returned when an internal invariant is violated.
    #[error("internal error: {0}")]
    Internal(&'static str),
}

impl Error {
    /// Returns `true` if this error is the distinguished exhaustion
    /// condition raised when a recommender sequence has no recommenders
    /// left.
    ///
    /// Callers that drive a
    /// [`SequentialMetaRecommender`](crate::recommender::SequentialMetaRecommender)
    /// in `raise` mode (or a streaming variant) are expected to catch this
    /// condition specifically to decide whether to supply more recommenders.
    #[must_use]
    pub fn is_no_recommenders_left(&self) -> bool {
        matches!(self, Error::NoRecommendersLeft { .. })
    }
}

pub type Result<T> = core::result::Result<T, Error>;
