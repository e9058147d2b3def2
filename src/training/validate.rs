use crate::backend::TrainRequest;

/// Raw text of the training form, exactly as typed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TrainingForm {
    pub epochs: String,
    pub batch_size: String,
    pub learning_rate: String,
    /// Comma-separated layer widths, e.g. `64,32,16`.
    pub hidden_layers: String,
}

impl Default for TrainingForm {
    fn default() -> Self {
        Self {
            epochs: "50".to_string(),
            batch_size: "32".to_string(),
            learning_rate: "0.001".to_string(),
            hidden_layers: "64,32,16".to_string(),
        }
    }
}

/// Inclusive limits applied to the training form.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HyperparameterBounds {
    pub epochs_min: u32,
    pub epochs_max: u32,
    pub batch_size_min: u32,
    pub batch_size_max: u32,
    pub learning_rate_min: f64,
    pub learning_rate_max: f64,
}

impl Default for HyperparameterBounds {
    fn default() -> Self {
        Self {
            epochs_min: 1,
            epochs_max: 1_000,
            batch_size_min: 1,
            batch_size_max: 512,
            learning_rate_min: 0.0001,
            learning_rate_max: 1.0,
        }
    }
}

/// Validated training parameters.
#[derive(Clone, Debug, PartialEq)]
pub struct Hyperparameters {
    pub epochs: u32,
    pub batch_size: u32,
    pub learning_rate: f64,
    pub hidden_layers: Vec<u32>,
}

impl Hyperparameters {
    pub fn to_request(&self) -> TrainRequest {
        TrainRequest {
            epochs: self.epochs,
            batch_size: self.batch_size,
            learning_rate: self.learning_rate,
            hidden_layers: self.hidden_layers.clone(),
            hidden_size: self.hidden_layers.first().copied().unwrap_or_default(),
        }
    }
}

/// Why the training form was refused.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum TrainingInputError {
    #[error("Epochs must be a whole number between {min} and {max} (got {value:?})")]
    Epochs { value: String, min: u32, max: u32 },
    #[error("Batch size must be a whole number between {min} and {max} (got {value:?})")]
    BatchSize { value: String, min: u32, max: u32 },
    #[error("Learning rate must be a number between {min} and {max} (got {value:?})")]
    LearningRate { value: String, min: f64, max: f64 },
    #[error("Enter at least one hidden layer size, e.g. 64,32,16")]
    NoHiddenLayers,
    #[error("Hidden layer size {token:?} is not a positive whole number")]
    HiddenLayer { token: String },
}

/// Check every field of `form` against `bounds`, stopping at the first problem.
pub fn validate(
    form: &TrainingForm,
    bounds: &HyperparameterBounds,
) -> Result<Hyperparameters, TrainingInputError> {
    let epochs = parse_count(&form.epochs, bounds.epochs_min, bounds.epochs_max).ok_or_else(
        || TrainingInputError::Epochs {
            value: form.epochs.clone(),
            min: bounds.epochs_min,
            max: bounds.epochs_max,
        },
    )?;
    let batch_size = parse_count(&form.batch_size, bounds.batch_size_min, bounds.batch_size_max)
        .ok_or_else(|| TrainingInputError::BatchSize {
            value: form.batch_size.clone(),
            min: bounds.batch_size_min,
            max: bounds.batch_size_max,
        })?;
    let learning_rate = form
        .learning_rate
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|rate| {
            rate.is_finite() && *rate >= bounds.learning_rate_min && *rate <= bounds.learning_rate_max
        })
        .ok_or_else(|| TrainingInputError::LearningRate {
            value: form.learning_rate.clone(),
            min: bounds.learning_rate_min,
            max: bounds.learning_rate_max,
        })?;
    let hidden_layers = parse_hidden_layers(&form.hidden_layers)?;
    Ok(Hyperparameters {
        epochs,
        batch_size,
        learning_rate,
        hidden_layers,
    })
}

/// Parse `64, 32, 16` into layer widths. Any bad token rejects the whole list.
pub fn parse_hidden_layers(raw: &str) -> Result<Vec<u32>, TrainingInputError> {
    if raw.trim().is_empty() {
        return Err(TrainingInputError::NoHiddenLayers);
    }
    raw.split(',')
        .map(str::trim)
        .map(|token| match token.parse::<u32>() {
            Ok(size) if size > 0 => Ok(size),
            _ => Err(TrainingInputError::HiddenLayer {
                token: token.to_string(),
            }),
        })
        .collect()
}

fn parse_count(raw: &str, min: u32, max: u32) -> Option<u32> {
    raw.trim()
        .parse::<u32>()
        .ok()
        .filter(|value| (min..=max).contains(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(epochs: &str, batch_size: &str, learning_rate: &str, layers: &str) -> TrainingForm {
        TrainingForm {
            epochs: epochs.to_string(),
            batch_size: batch_size.to_string(),
            learning_rate: learning_rate.to_string(),
            hidden_layers: layers.to_string(),
        }
    }

    #[test]
    fn default_form_is_valid() {
        let params = validate(&TrainingForm::default(), &HyperparameterBounds::default()).unwrap();
        assert_eq!(params.epochs, 50);
        assert_eq!(params.batch_size, 32);
        assert_eq!(params.learning_rate, 0.001);
        assert_eq!(params.hidden_layers, vec![64, 32, 16]);
    }

    #[test]
    fn hidden_layers_tolerate_spaces() {
        assert_eq!(parse_hidden_layers("64, 32, 16").unwrap(), vec![64, 32, 16]);
        assert_eq!(parse_hidden_layers(" 8 ").unwrap(), vec![8]);
    }

    #[test]
    fn hidden_layers_name_the_bad_token() {
        assert_eq!(
            parse_hidden_layers("64,0,16"),
            Err(TrainingInputError::HiddenLayer {
                token: "0".to_string()
            })
        );
        let err = parse_hidden_layers("abc").unwrap_err();
        assert!(err.to_string().contains("\"abc\""));
        assert_eq!(
            parse_hidden_layers("64,,16"),
            Err(TrainingInputError::HiddenLayer {
                token: String::new()
            })
        );
        assert_eq!(parse_hidden_layers("  "), Err(TrainingInputError::NoHiddenLayers));
    }

    #[test]
    fn epochs_outside_range_or_fractional_are_rejected() {
        let bounds = HyperparameterBounds::default();
        for epochs in ["0", "1001", "3.5", "", "-2"] {
            let err = validate(&form(epochs, "32", "0.001", "64"), &bounds).unwrap_err();
            assert!(
                matches!(err, TrainingInputError::Epochs { .. }),
                "{epochs:?} gave {err:?}"
            );
        }
        assert!(validate(&form("1000", "32", "0.001", "64"), &bounds).is_ok());
        assert!(validate(&form("1", "32", "0.001", "64"), &bounds).is_ok());
    }

    #[test]
    fn batch_size_limits() {
        let bounds = HyperparameterBounds::default();
        assert!(validate(&form("5", "512", "0.001", "64"), &bounds).is_ok());
        assert!(matches!(
            validate(&form("5", "513", "0.001", "64"), &bounds),
            Err(TrainingInputError::BatchSize { .. })
        ));
    }

    #[test]
    fn learning_rate_must_be_finite_and_in_bounds() {
        let bounds = HyperparameterBounds::default();
        for rate in ["0", "1.5", "NaN", "inf", "fast"] {
            assert!(
                matches!(
                    validate(&form("5", "32", rate, "64"), &bounds),
                    Err(TrainingInputError::LearningRate { .. })
                ),
                "{rate:?} accepted"
            );
        }
        let narrow = HyperparameterBounds {
            learning_rate_max: 0.01,
            ..bounds
        };
        assert!(validate(&form("5", "32", "0.1", "64"), &narrow).is_err());
        assert!(validate(&form("5", "32", "0.01", "64"), &narrow).is_ok());
    }

    #[test]
    fn request_carries_first_layer_as_hidden_size() {
        let params = validate(
            &form("3", "16", "0.01", "128, 64"),
            &HyperparameterBounds::default(),
        )
        .unwrap();
        let request = params.to_request();
        assert_eq!(request.hidden_layers, vec![128, 64]);
        assert_eq!(request.hidden_size, 128);
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["epochs"], 3);
        assert_eq!(json["batch_size"], 16);
    }
}
