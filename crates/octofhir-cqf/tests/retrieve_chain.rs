//! Priority fallback across retrieve providers

mod common;

use common::{ids, patients, MockRetrieveProvider};
use octofhir_cqf::repository::InMemoryRepository;
use octofhir_cqf::retrieve::{RepositoryRetrieveProvider, RetrieveError};
use octofhir_cqf::{
    BundleRetrieveProvider, CqfError, FhirModelResolver, FhirVersion, ModelResolver,
    PriorityRetrieveProvider, RetrieveProvider, RetrieveRequest, StatusClass,
};
use pretty_assertions::assert_eq;
use std::sync::Arc;

fn resolver() -> Arc<dyn ModelResolver> {
    Arc::new(FhirModelResolver::new(FhirVersion::R4))
}

#[test]
fn test_first_non_empty_provider_wins() {
    let first = Arc::new(MockRetrieveProvider::empty());
    let second = Arc::new(MockRetrieveProvider::returning(patients(&["1", "2", "3"])));
    let third = Arc::new(MockRetrieveProvider::returning(patients(&["5", "4", "3", "2", "1"])));
    let chain = PriorityRetrieveProvider::with_providers([
        first.clone() as Arc<dyn RetrieveProvider>,
        second.clone(),
        third.clone(),
    ]);

    let result = chain.retrieve(&RetrieveRequest::new("Patient")).unwrap().unwrap();

    assert_eq!(ids(&result), vec!["1", "2", "3"]);
    assert_eq!(first.calls(), 1);
    assert_eq!(second.calls(), 1);
    assert_eq!(third.calls(), 0);
}

#[test]
fn test_unknown_result_fails_even_with_data_later() {
    let unknown = Arc::new(MockRetrieveProvider::unknown());
    let later = Arc::new(MockRetrieveProvider::returning(patients(&["1"])));
    let chain = PriorityRetrieveProvider::with_providers([
        unknown.clone() as Arc<dyn RetrieveProvider>,
        later.clone(),
    ]);

    let err = chain.retrieve(&RetrieveRequest::new("Patient")).unwrap_err();

    assert!(matches!(err, RetrieveError::ContractViolation { position: 0, .. }));
    assert_eq!(later.calls(), 0);
    assert_eq!(CqfError::from(err).status_class(), StatusClass::ServerError);
}

#[test]
fn test_bundle_falls_back_to_repository() {
    let bundle = BundleRetrieveProvider::new(patients(&["bundle-patient"]), resolver());
    let repository = InMemoryRepository::from_resources(vec![serde_json::json!({
        "resourceType": "Condition",
        "id": "repository-condition",
        "subject": { "reference": "Patient/bundle-patient" }
    })])
    .unwrap();
    let chain = PriorityRetrieveProvider::with_providers([
        Arc::new(bundle) as Arc<dyn RetrieveProvider>,
        Arc::new(RepositoryRetrieveProvider::new(Arc::new(repository), resolver())),
    ]);

    let patients = chain.retrieve(&RetrieveRequest::new("Patient")).unwrap().unwrap();
    assert_eq!(ids(&patients), vec!["bundle-patient"]);

    let conditions = chain
        .retrieve(&RetrieveRequest::new("Condition").with_context("Patient", Some("subject"), "bundle-patient"))
        .unwrap()
        .unwrap();
    assert_eq!(ids(&conditions), vec!["repository-condition"]);
}

#[test]
fn test_all_empty_is_empty() {
    let chain = PriorityRetrieveProvider::with_providers([
        Arc::new(MockRetrieveProvider::empty()) as Arc<dyn RetrieveProvider>,
        Arc::new(MockRetrieveProvider::empty()),
    ]);
    let result = chain.retrieve(&RetrieveRequest::new("Observation")).unwrap();
    assert_eq!(result, Some(Vec::new()));
}

#[test]
fn test_registering_same_instance_twice_is_ignored() {
    let chain = PriorityRetrieveProvider::new();
    let provider: Arc<dyn RetrieveProvider> = Arc::new(MockRetrieveProvider::empty());

    assert!(chain.register(provider.clone()));
    assert!(!chain.register(provider));
    assert!(chain.register(Arc::new(MockRetrieveProvider::empty())));
    assert_eq!(chain.len(), 2);
}
