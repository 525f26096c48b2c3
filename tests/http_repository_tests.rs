use classplan::{
    HttpRepository, ProjectDescriptor, Repository, ResolveError, Resolver, Scope,
};
use httpmock::prelude::*;

const CLASSGRAPH_POM_PATH: &str =
    "/io/github/classgraph/classgraph/4.8.184/classgraph-4.8.184.pom";

const JUNIT_BOM_POM: &str = r#"
<project>
  <groupId>org.junit</groupId>
  <artifactId>junit-bom</artifactId>
  <version>5.10.0</version>
  <dependencyManagement>
    <dependencies>
      <dependency>
        <groupId>org.junit.jupiter</groupId>
        <artifactId>junit-jupiter</artifactId>
        <version>5.10.0</version>
      </dependency>
    </dependencies>
  </dependencyManagement>
</project>
"#;

#[test]
fn test_contains_uses_maven_layout() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path(CLASSGRAPH_POM_PATH);
        then.status(200).body("<project/>");
    });

    let repository = HttpRepository::new("central", &server.base_url());
    let present = repository
        .contains(&"io.github.classgraph:classgraph:4.8.184".parse().unwrap())
        .unwrap();

    assert!(present);
    mock.assert();
}

#[test]
fn test_absent_coordinate_is_not_contained() {
    let server = MockServer::start();
    // No mock registered: every path 404s.

    let repository = HttpRepository::new("central", &server.base_url());
    let present = repository
        .contains(&"org.example:missing:1.0".parse().unwrap())
        .unwrap();

    assert!(!present);
}

#[test]
fn test_server_error_is_surfaced_not_swallowed() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path(CLASSGRAPH_POM_PATH);
        then.status(500);
    });

    let repository = HttpRepository::new("central", &server.base_url());
    let result =
        repository.contains(&"io.github.classgraph:classgraph:4.8.184".parse().unwrap());

    assert!(result.is_err());
}

#[test]
fn test_platform_imports_parsed_from_pom() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET)
            .path("/org/junit/junit-bom/5.10.0/junit-bom-5.10.0.pom");
        then.status(200).body(JUNIT_BOM_POM);
    });

    let repository = HttpRepository::new("central", &server.base_url());
    let imports = repository
        .platform_imports(&"org.junit:junit-bom:5.10.0".parse().unwrap())
        .unwrap()
        .unwrap();

    assert_eq!(
        imports.get(&"org.junit.jupiter:junit-jupiter".parse().unwrap()),
        Some(&"5.10.0".to_string())
    );
}

#[test]
fn test_end_to_end_resolution_over_http() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path(CLASSGRAPH_POM_PATH);
        then.status(200).body("<project/>");
    });
    server.mock(|when, then| {
        when.method(GET)
            .path("/org/junit/junit-bom/5.10.0/junit-bom-5.10.0.pom");
        then.status(200).body(JUNIT_BOM_POM);
    });
    server.mock(|when, then| {
        when.method(GET)
            .path("/org/junit/jupiter/junit-jupiter/5.10.0/junit-jupiter-5.10.0.pom");
        then.status(200).body("<project/>");
    });

    let toml = format!(
        r#"
        [project]
        group = "org.example"
        version = "1.0-SNAPSHOT"

        [[repositories]]
        name = "mock-central"
        url = "{}"

        [[dependencies]]
        coordinate = "io.github.classgraph:classgraph:4.8.184"
        scope = "compile"

        [[dependencies]]
        coordinate = "org.junit:junit-bom:5.10.0"
        scope = "test-compile"
        platform = true

        [[dependencies]]
        coordinate = "org.junit.jupiter:junit-jupiter"
        scope = "test-compile"
        "#,
        server.base_url()
    );

    let descriptor = ProjectDescriptor::from_str(&toml).unwrap();
    let plan = Resolver::for_descriptor(&descriptor)
        .resolve(&descriptor)
        .unwrap();

    assert_eq!(plan.entries(Scope::Compile).len(), 1);
    assert_eq!(plan.entries(Scope::Compile)[0].repository, "mock-central");
    assert_eq!(
        plan.entries(Scope::TestCompile)[0].coordinate.to_string(),
        "org.junit.jupiter:junit-jupiter:5.10.0"
    );
}

#[test]
fn test_first_repository_wins_over_http() {
    let first = MockServer::start();
    let second = MockServer::start();
    first.mock(|when, then| {
        when.method(GET).path(CLASSGRAPH_POM_PATH);
        then.status(200).body("<project/>");
    });
    second.mock(|when, then| {
        when.method(GET).path(CLASSGRAPH_POM_PATH);
        then.status(200).body("<project/>");
    });

    let resolver = Resolver::new(vec![
        Box::new(HttpRepository::new("first", &first.base_url())),
        Box::new(HttpRepository::new("second", &second.base_url())),
    ]);

    let toml = r#"
        [project]
        group = "org.example"
        version = "1.0"

        [[dependencies]]
        coordinate = "io.github.classgraph:classgraph:4.8.184"
        scope = "compile"
    "#;
    let descriptor = ProjectDescriptor::from_str(toml).unwrap();
    let plan = resolver.resolve(&descriptor).unwrap();

    assert_eq!(plan.entries(Scope::Compile)[0].repository, "first");
}

#[test]
fn test_unresolved_over_http() {
    let server = MockServer::start();

    let resolver = Resolver::new(vec![Box::new(HttpRepository::new(
        "central",
        &server.base_url(),
    ))]);

    let toml = r#"
        [project]
        group = "org.example"
        version = "1.0"

        [[dependencies]]
        coordinate = "org.example:nowhere:1.0"
        scope = "compile"
    "#;
    let descriptor = ProjectDescriptor::from_str(toml).unwrap();
    let err = resolver.resolve(&descriptor).unwrap_err();

    assert!(matches!(err, ResolveError::UnresolvedDependency { .. }));
}
