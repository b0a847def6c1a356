//! DynamoDB error mapping.
//!
//! Maps AWS SDK errors to `RepositoryError` from `dyndoc_core::storage`.

use std::fmt::Debug;

use aws_sdk_dynamodb::error::SdkError;
use aws_sdk_dynamodb::operation::create_table::CreateTableError;
use aws_sdk_dynamodb::operation::describe_table::DescribeTableError;
use aws_sdk_dynamodb::operation::get_item::GetItemError;
use aws_sdk_dynamodb::operation::put_item::PutItemError;
use dyndoc_core::storage::RepositoryError;

/// Transport-level failures mean the store could not be reached at all.
fn map_transport_error<E: Debug, R: Debug>(err: &SdkError<E, R>) -> Option<RepositoryError> {
    match err {
        SdkError::DispatchFailure(_) | SdkError::TimeoutError(_) => Some(
            RepositoryError::ConnectionFailed(format!("DynamoDB unreachable: {:?}", err)),
        ),
        _ => None,
    }
}

/// Map a DescribeTable SDK error. A missing table is `Ok(None)`.
pub fn map_describe_table_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<DescribeTableError, R>,
) -> Result<Option<()>, RepositoryError> {
    if let Some(transport) = map_transport_error(&err) {
        return Err(transport);
    }
    match err.into_service_error() {
        DescribeTableError::ResourceNotFoundException(_) => Ok(None),
        DescribeTableError::InternalServerError(_) => Err(RepositoryError::QueryFailed(
            "DynamoDB internal server error".to_string(),
        )),
        err => Err(RepositoryError::QueryFailed(format!(
            "DescribeTable failed: {:?}",
            err
        ))),
    }
}

/// Map a CreateTable SDK error. A table that already exists is `Ok(())`.
pub fn map_create_table_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<CreateTableError, R>,
) -> Result<(), RepositoryError> {
    if let Some(transport) = map_transport_error(&err) {
        return Err(transport);
    }
    match err.into_service_error() {
        CreateTableError::ResourceInUseException(_) => Ok(()),
        CreateTableError::LimitExceededException(_) => Err(RepositoryError::QueryFailed(
            "Table limit exceeded, please retry".to_string(),
        )),
        CreateTableError::InternalServerError(_) => Err(RepositoryError::QueryFailed(
            "DynamoDB internal server error".to_string(),
        )),
        err => Err(RepositoryError::QueryFailed(format!(
            "CreateTable failed: {:?}",
            err
        ))),
    }
}

/// Map a GetItem SDK error. A missing table reads as `Ok(None)`.
pub fn map_get_item_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<GetItemError, R>,
) -> Result<Option<()>, RepositoryError> {
    if let Some(transport) = map_transport_error(&err) {
        return Err(transport);
    }
    match err.into_service_error() {
        GetItemError::ResourceNotFoundException(_) => Ok(None),
        GetItemError::ProvisionedThroughputExceededException(_) => Err(
            RepositoryError::QueryFailed("Throughput exceeded, please retry".to_string()),
        ),
        GetItemError::RequestLimitExceeded(_) => Err(RepositoryError::QueryFailed(
            "Request limit exceeded, please retry".to_string(),
        )),
        GetItemError::InternalServerError(_) => Err(RepositoryError::QueryFailed(
            "DynamoDB internal server error".to_string(),
        )),
        err => Err(RepositoryError::QueryFailed(format!(
            "GetItem failed: {:?}",
            err
        ))),
    }
}

/// Map a PutItem SDK error for document `id` written to `table`.
pub fn map_put_item_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<PutItemError, R>,
    id: &str,
    table: &str,
) -> RepositoryError {
    if let Some(transport) = map_transport_error(&err) {
        return transport;
    }
    match err.into_service_error() {
        PutItemError::ConditionalCheckFailedException(_) => RepositoryError::AlreadyExists {
            entity_type: "Document",
            id: id.to_string(),
        },
        PutItemError::ResourceNotFoundException(_) => RepositoryError::NotFound {
            entity_type: "Collection",
            id: table.to_string(),
        },
        PutItemError::ProvisionedThroughputExceededException(_) => {
            RepositoryError::QueryFailed("Throughput exceeded, please retry".to_string())
        }
        PutItemError::RequestLimitExceeded(_) => {
            RepositoryError::QueryFailed("Request limit exceeded, please retry".to_string())
        }
        PutItemError::ItemCollectionSizeLimitExceededException(_) => {
            RepositoryError::QueryFailed("Item collection size limit exceeded".to_string())
        }
        PutItemError::InternalServerError(_) => {
            RepositoryError::QueryFailed("DynamoDB internal server error".to_string())
        }
        err => RepositoryError::QueryFailed(format!("PutItem failed: {:?}", err)),
    }
}
