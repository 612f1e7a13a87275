use podbox::test_support::FakeEngine;
use podbox::{ClientConfig, ClientError, ImageClient, ImageRef};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

fn create_client() -> (ImageClient, Arc<FakeEngine>) {
    let engine = Arc::new(FakeEngine::new());
    let client = ImageClient::new(engine.clone(), ClientConfig::default());
    (client, engine)
}

fn test_function_artifact() -> &'static str {
    "unit main {\n    print \"Hello, World!\"\n}\n"
}

fn test_service_packages(dir: &Path) -> Vec<PathBuf> {
    let package = dir.join("echo-service.pkg");
    fs::write(&package, "packaged echo service").unwrap();
    vec![package]
}

#[test]
fn test_successful_delete_image() {
    let (client, _engine) = create_client();

    let image = client
        .create_main_image("TestFunction2", None, test_function_artifact(), None, None)
        .unwrap();
    assert_eq!(image.reference(), "testfunction2:latest");

    let deleted = client.delete_image("testfunction2", None).unwrap();
    assert!(deleted, "image deletion should report true");
}

#[test]
fn test_successful_image_exists() {
    let (client, _engine) = create_client();

    let image = client
        .create_main_image("TestFunction3", None, test_function_artifact(), None, None)
        .unwrap();
    assert_eq!(image.reference(), "testfunction3:latest");

    let found = client.get_image("testfunction3").unwrap();
    assert_eq!(found, Some(ImageRef::new("testfunction3", "latest")));
}

#[test]
fn test_failed_delete_image() {
    let (client, _engine) = create_client();

    let deleted = client.delete_image("nonexistentimage1", None).unwrap();
    assert!(!deleted, "deleting a missing image must report false");
}

#[test]
fn test_failed_image_exists() {
    let (client, _engine) = create_client();

    let found = client.get_image("nonexistentimage2").unwrap();
    assert_eq!(found, None);
}

#[test]
fn test_failed_image_creation_blank_unit_name() {
    let (client, engine) = create_client();
    let dir = tempfile::tempdir().unwrap();

    let err = client
        .create_service_image("", None, &test_service_packages(dir.path()), None, None)
        .unwrap_err();

    assert!(matches!(err, ClientError::InvalidArgument(_)));
    assert!(engine.commands().is_empty(), "engine must not be contacted");
}

#[test]
fn test_failed_image_creation_empty_package_paths() {
    let (client, engine) = create_client();

    let err = client
        .create_service_image("TestService1", None, &[], None, None)
        .unwrap_err();

    assert!(matches!(err, ClientError::InvalidArgument(_)));
    assert!(engine.commands().is_empty(), "engine must not be contacted");
}

#[test]
fn test_failed_image_creation_nonexistent_package_path() {
    let (client, engine) = create_client();
    let packages = vec![PathBuf::from("/non/existent/path/package.pkg")];

    let err = client
        .create_service_image("TestService1", None, &packages, None, None)
        .unwrap_err();

    assert!(matches!(
        err,
        ClientError::PackageNotFound { ref path } if path == &packages[0]
    ));
    assert!(engine.commands().is_empty(), "engine must not be contacted");
}

#[test]
fn test_failed_image_creation_missing_version_with_image_name() {
    let (client, engine) = create_client();
    let dir = tempfile::tempdir().unwrap();

    let err = client
        .create_service_image(
            "TestService1",
            None,
            &test_service_packages(dir.path()),
            Some("customImage"),
            None,
        )
        .unwrap_err();

    assert!(matches!(err, ClientError::MissingVersion { ref name } if name == "customImage"));
    assert!(engine.commands().is_empty(), "engine must not be contacted");
}

#[test]
fn test_successful_image_create_with_custom_image_name() {
    let (client, engine) = create_client();
    let dir = tempfile::tempdir().unwrap();

    let image = client
        .create_service_image(
            "TestService1",
            None,
            &test_service_packages(dir.path()),
            Some("customimagename"),
            Some("0.0.1"),
        )
        .unwrap();

    assert_eq!(image.reference(), "customimagename:0.0.1");
    assert!(engine.has_image("customimagename:0.0.1"));
    // the unit name plays no part in the reference once a custom name is given
    assert!(!engine.has_image("testservice1:latest"));
}
