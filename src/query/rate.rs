use crate::error::{ClientError, ClientResult};

/// Counter handling for the rate transform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateOptions {
    pub counter: bool,
    /// Maximum counter value before rollover; `None` lets the server decide.
    pub counter_max: Option<f64>,
    pub reset_value: f64,
}

impl Default for RateOptions {
    fn default() -> Self {
        Self {
            counter: false,
            counter_max: None,
            reset_value: 0.0,
        }
    }
}

impl RateOptions {
    /// Applies the supplied fields of `update`, validating all of them first.
    pub fn merged(&self, update: RateOptionsUpdate) -> ClientResult<Self> {
        if let Some(Some(max)) = update.counter_max {
            if !max.is_finite() {
                return Err(ClientError::invalid_argument("counter max must be numeric"));
            }
        }
        if let Some(reset) = update.reset_value {
            if !reset.is_finite() {
                return Err(ClientError::invalid_argument("reset value must be numeric"));
            }
        }

        Ok(Self {
            counter: update.counter.unwrap_or(self.counter),
            counter_max: update.counter_max.unwrap_or(self.counter_max),
            reset_value: update.reset_value.unwrap_or(self.reset_value),
        })
    }
}

/// A partial rate options update; `None` fields are left untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RateOptionsUpdate {
    pub counter: Option<bool>,
    pub counter_max: Option<Option<f64>>,
    pub reset_value: Option<f64>,
}

impl RateOptionsUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn counter(mut self, counter: bool) -> Self {
        self.counter = Some(counter);
        self
    }

    pub fn counter_max(mut self, counter_max: Option<f64>) -> Self {
        self.counter_max = Some(counter_max);
        self
    }

    pub fn reset_value(mut self, reset_value: f64) -> Self {
        self.reset_value = Some(reset_value);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_merge_keeps_omitted_fields() {
        let opts = RateOptions::default()
            .merged(RateOptionsUpdate::new().counter(true).counter_max(Some(65535.0)))
            .unwrap();
        let opts = opts.merged(RateOptionsUpdate::new().reset_value(5.0)).unwrap();

        assert!(opts.counter);
        assert_eq!(opts.counter_max, Some(65535.0));
        assert_eq!(opts.reset_value, 5.0);

        let cleared = opts.merged(RateOptionsUpdate::new().counter_max(None)).unwrap();
        assert_eq!(cleared.counter_max, None);
        assert!(cleared.counter);
    }

    #[test]
    fn test_invalid_update_changes_nothing() {
        let opts = RateOptions::default();
        let err = opts
            .merged(RateOptionsUpdate::new().counter(true).reset_value(f64::NAN))
            .unwrap_err();
        assert!(matches!(err, ClientError::InvalidArgument { .. }));
        assert!(opts
            .merged(RateOptionsUpdate::new().counter_max(Some(f64::INFINITY)))
            .is_err());
        assert_eq!(opts, RateOptions::default());
    }
}
