//! Model resolution across sessions sharing one global cache

mod common;

use common::CountingModelLoader;
use octofhir_cqf::model::{ModelError, ModelInfo, ModelResolverRegistry};
use octofhir_cqf::{CqfError, FhirVersion, GlobalModelCache, ModelManager, StatusClass, VersionedIdentifier};
use pretty_assertions::assert_eq;
use std::sync::Arc;

fn fhir(version: &str) -> ModelInfo {
    ModelInfo::new("FHIR", Some(version.to_string()))
}

fn setup() -> (Arc<CountingModelLoader>, Arc<GlobalModelCache>) {
    let loader = Arc::new(CountingModelLoader::new([fhir("3.0.0"), fhir("4.0.0")]));
    (loader, Arc::new(GlobalModelCache::new()))
}

#[test]
fn test_same_version_resolves_to_one_cached_descriptor() {
    let (loader, global) = setup();
    let mut session = ModelManager::with_global_cache(loader.clone(), global.clone());
    let fhir4 = VersionedIdentifier::with_version("FHIR", "4.0.0");

    let first = session.resolve(&fhir4).unwrap();
    let second = session.resolve(&fhir4).unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(loader.loads(), 1);
}

#[test]
fn test_second_version_in_one_session_conflicts() {
    let (loader, global) = setup();
    let mut session = ModelManager::with_global_cache(loader, global);

    session
        .resolve(&VersionedIdentifier::with_version("FHIR", "4.0.0"))
        .unwrap();
    let err = session
        .resolve(&VersionedIdentifier::with_version("FHIR", "3.0.0"))
        .unwrap_err();

    match &err {
        ModelError::VersionConflict { id, loaded, requested } => {
            assert_eq!(id, "FHIR");
            assert_eq!(loaded, "4.0.0");
            assert_eq!(requested, "3.0.0");
        }
        other => panic!("expected a version conflict, got {other:?}"),
    }

    let err = CqfError::from(err);
    assert_eq!(err.status_class(), StatusClass::ClientError);
    assert_eq!(err.http_status(), 409);
}

#[test]
fn test_sessions_share_the_global_cache() {
    let (loader, global) = setup();
    let fhir4 = VersionedIdentifier::with_version("FHIR", "4.0.0");

    let from_first = ModelManager::with_global_cache(loader.clone(), global.clone())
        .resolve(&fhir4)
        .unwrap();
    let from_second = ModelManager::with_global_cache(loader.clone(), global.clone())
        .resolve(&fhir4)
        .unwrap();

    assert!(Arc::ptr_eq(&from_first, &from_second));
    assert_eq!(loader.loads(), 1);

    // another session may pick the other version
    let mut third = ModelManager::with_global_cache(loader.clone(), global);
    let fhir3 = third
        .resolve(&VersionedIdentifier::with_version("FHIR", "3.0.0"))
        .unwrap();
    assert_eq!(fhir3.version(), Some("3.0.0"));
    assert_eq!(loader.loads(), 2);
}

#[test]
fn test_unknown_model_is_not_found() {
    let (loader, global) = setup();
    let mut session = ModelManager::with_global_cache(loader, global.clone());

    let err = session.resolve(&VersionedIdentifier::new("QDM")).unwrap_err();

    assert!(matches!(err, ModelError::NotFound { .. }));
    assert_eq!(CqfError::from(err).http_status(), 404);
    assert!(global.is_empty());
}

#[test]
fn test_resolver_registry_for_fhir_versions() {
    let registry = ModelResolverRegistry::with_defaults();
    assert_eq!(registry.create_for("4.0.1").unwrap().fhir_version(), FhirVersion::R4);
    assert_eq!(registry.create_for("3.0.2").unwrap().fhir_version(), FhirVersion::Dstu3);

    let err = registry.create_for("1.0.2").map(|_| ()).unwrap_err();
    assert!(matches!(err, ModelError::UnsupportedFhirVersion(_)));
}
