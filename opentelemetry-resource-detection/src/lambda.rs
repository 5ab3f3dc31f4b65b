use crate::context::DetectContext;
use crate::detector::{CreateSettings, Detector, DetectorConfig};
use crate::error::DetectError;
use crate::resource::{Resource, Value};
use async_trait::async_trait;
use opentelemetry_semantic_conventions as semconv;
use std::env;

// For a complete list of reserved environment variables in Lambda, see:
// https://docs.aws.amazon.com/lambda/latest/dg/configuration-envvars.html
const AWS_LAMBDA_FUNCTION_NAME_ENV_VAR: &str = "AWS_LAMBDA_FUNCTION_NAME";
const AWS_REGION_ENV_VAR: &str = "AWS_REGION";
const AWS_LAMBDA_FUNCTION_VERSION_ENV_VAR: &str = "AWS_LAMBDA_FUNCTION_VERSION";
const AWS_LAMBDA_LOG_STREAM_NAME_ENV_VAR: &str = "AWS_LAMBDA_LOG_STREAM_NAME";
const AWS_LAMBDA_MEMORY_LIMIT_ENV_VAR: &str = "AWS_LAMBDA_FUNCTION_MEMORY_SIZE";
const AWS_LAMBDA_LOG_GROUP_NAME_ENV_VAR: &str = "AWS_LAMBDA_LOG_GROUP_NAME";

/// Resource detector that collects resource information from AWS Lambda environment.
#[derive(Debug, Default)]
pub struct LambdaResourceDetector;

impl LambdaResourceDetector {
    pub(crate) fn create(
        _settings: &CreateSettings,
        _config: DetectorConfig,
    ) -> Result<Box<dyn Detector>, DetectError> {
        Ok(Box::new(LambdaResourceDetector))
    }
}

#[async_trait]
impl Detector for LambdaResourceDetector {
    async fn detect(&self, ctx: &DetectContext) -> Result<Resource, DetectError> {
        if let Some(err) = ctx.err() {
            return Err(err.into());
        }
        let lambda_name = env::var(AWS_LAMBDA_FUNCTION_NAME_ENV_VAR).unwrap_or_default();
        // No function name means this is not a Lambda environment.
        if lambda_name.is_empty() {
            return Ok(Resource::empty());
        }

        let aws_region = env::var(AWS_REGION_ENV_VAR).unwrap_or_default();
        let function_version = env::var(AWS_LAMBDA_FUNCTION_VERSION_ENV_VAR).unwrap_or_default();
        // MB (string) to bytes (int). A size that does not fit is not reported.
        let function_memory_limit = match env::var(AWS_LAMBDA_MEMORY_LIMIT_ENV_VAR) {
            Ok(s) => s.parse::<i64>().unwrap_or_default().checked_mul(1024 * 1024),
            Err(_) => Some(0),
        };
        // The log stream name identifies the function instance.
        let instance = env::var(AWS_LAMBDA_LOG_STREAM_NAME_ENV_VAR).unwrap_or_default();
        let log_group_name = env::var(AWS_LAMBDA_LOG_GROUP_NAME_ENV_VAR).unwrap_or_default();

        let mut resource = Resource::from_attributes([
            (semconv::resource::CLOUD_PROVIDER, Value::from("aws")),
            (semconv::resource::CLOUD_REGION, Value::from(aws_region)),
            (semconv::resource::FAAS_INSTANCE, Value::from(instance)),
            (semconv::resource::FAAS_NAME, Value::from(lambda_name)),
            (semconv::resource::FAAS_VERSION, Value::from(function_version)),
            (
                semconv::resource::AWS_LOG_GROUP_NAMES,
                Value::Array(vec![Value::from(log_group_name)]),
            ),
        ]);
        if let Some(function_memory_limit) = function_memory_limit {
            resource.insert(semconv::resource::FAAS_MAX_MEMORY, function_memory_limit);
        }
        Ok(resource)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detect() -> Resource {
        tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .unwrap()
            .block_on(LambdaResourceDetector.detect(&DetectContext::background()))
            .unwrap()
    }

    #[test]
    fn test_aws_lambda_detector() {
        temp_env::with_vars(
            [
                (AWS_LAMBDA_FUNCTION_NAME_ENV_VAR, Some("my-lambda-function")),
                (AWS_REGION_ENV_VAR, Some("eu-west-3")),
                (AWS_LAMBDA_FUNCTION_VERSION_ENV_VAR, Some("$LATEST")),
                (
                    AWS_LAMBDA_LOG_STREAM_NAME_ENV_VAR,
                    Some("2023/01/01/[$LATEST]5d1edb9e525d486696cf01a3503487bc"),
                ),
                (AWS_LAMBDA_MEMORY_LIMIT_ENV_VAR, Some("128")),
                (
                    AWS_LAMBDA_LOG_GROUP_NAME_ENV_VAR,
                    Some("/aws/lambda/my-lambda-function"),
                ),
            ],
            || {
                let expected = Resource::from_attributes([
                    (semconv::resource::CLOUD_PROVIDER, Value::from("aws")),
                    (semconv::resource::CLOUD_REGION, Value::from("eu-west-3")),
                    (
                        semconv::resource::FAAS_INSTANCE,
                        Value::from("2023/01/01/[$LATEST]5d1edb9e525d486696cf01a3503487bc"),
                    ),
                    (semconv::resource::FAAS_NAME, Value::from("my-lambda-function")),
                    (semconv::resource::FAAS_VERSION, Value::from("$LATEST")),
                    (
                        semconv::resource::FAAS_MAX_MEMORY,
                        Value::I64(128 * 1024 * 1024),
                    ),
                    (
                        semconv::resource::AWS_LOG_GROUP_NAMES,
                        Value::Array(vec![Value::from("/aws/lambda/my-lambda-function")]),
                    ),
                ]);

                assert_eq!(expected, detect());
            },
        );
    }

    #[test]
    fn test_aws_lambda_detector_returns_empty_if_no_lambda_environment() {
        temp_env::with_var_unset(AWS_LAMBDA_FUNCTION_NAME_ENV_VAR, || {
            assert!(detect().is_empty());
        });
    }

    #[test]
    fn test_aws_lambda_detector_skips_oversized_memory_limit() {
        temp_env::with_vars(
            [
                (AWS_LAMBDA_FUNCTION_NAME_ENV_VAR, Some("my-lambda-function")),
                (AWS_LAMBDA_MEMORY_LIMIT_ENV_VAR, Some("9007199254740993")),
            ],
            || {
                let resource = detect();

                assert_eq!(
                    resource.get(semconv::resource::FAAS_NAME),
                    Some(&Value::from("my-lambda-function"))
                );
                assert!(resource.get(semconv::resource::FAAS_MAX_MEMORY).is_none());
            },
        );
    }

    #[test]
    fn test_aws_lambda_detector_cancelled() {
        temp_env::with_var(AWS_LAMBDA_FUNCTION_NAME_ENV_VAR, Some("my-lambda-function"), || {
            let (ctx, handle) = DetectContext::with_cancel();
            handle.cancel();

            let err = tokio::runtime::Builder::new_current_thread()
                .enable_time()
                .build()
                .unwrap()
                .block_on(LambdaResourceDetector.detect(&ctx))
                .unwrap_err();
            assert!(matches!(
                err,
                DetectError::Context(crate::context::ContextError::Cancelled)
            ));
        });
    }
}
