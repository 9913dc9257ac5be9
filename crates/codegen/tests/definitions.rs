//! End-to-end generation of component and trait documents.

mod common;

use common::{generator, init_logging};
use defkit_codegen::{CueGenerator, GeneratorConfig};
use defkit_core::functions::strconv_format_int;
use defkit_core::{
    context, patch, resource, ComponentDefinition, Definition, Directive, Param, TraitDefinition,
};
use indoc::indoc;

fn webservice() -> ComponentDefinition {
    let image = Param::string("image").required().description("Container image");
    let replicas = Param::int("replicas").default(1);
    let cpu = Param::string("cpu");
    ComponentDefinition::new("webservice")
        .description("Web service component")
        .workload("apps/v1", "Deployment")
        .params([image.clone(), replicas.clone(), cpu.clone()])
        .template(|tpl| {
            tpl.output(
                resource("apps/v1", "Deployment")
                    .set("metadata.name", context::name())
                    .set("spec.replicas", &replicas)
                    .set("spec.template.spec.containers[0].name", context::name())
                    .set("spec.template.spec.containers[0].image", &image)
                    .set_if(
                        cpu.is_set(),
                        "spec.template.spec.containers[0].resources.limits.cpu",
                        &cpu,
                    )
                    .set_if(
                        cpu.is_set(),
                        "spec.template.spec.containers[0].resources.requests.cpu",
                        &cpu,
                    ),
            );
        })
}

#[test]
fn test_component_document() {
    init_logging();
    let out = generator().generate_component(&webservice());
    similar_asserts::assert_eq!(
        out,
        indoc! {r#"
            webservice: {
                type: "component"
                annotations: {}
                labels: {}
                description: "Web service component"
                attributes: {
                    workload: {
                        definition: {
                            apiVersion: "apps/v1"
                            kind:       "Deployment"
                        }
                        type: "deployments.apps"
                    }
                }
            }
            template: {
                output: {
                    apiVersion: "apps/v1"
                    kind:       "Deployment"
                    metadata: {
                        name: context.name
                    }
                    spec: {
                        replicas: parameter.replicas
                        template: {
                            spec: {
                                containers: [{
                                    name: context.name
                                    image: parameter.image
                                    if parameter["cpu"] != _|_ {
                                        resources: {
                                            limits: {
                                                cpu: parameter.cpu
                                            }
                                            requests: {
                                                cpu: parameter.cpu
                                            }
                                        }
                                    }
                                }]
                            }
                        }
                    }
                }
                parameter: {
                    // +usage=Container image
                    image: string
                    replicas: *1 | int
                    cpu?: string
                }
            }
        "#}
    );
}

#[test]
fn test_trait_document() {
    init_logging();
    let cpu = Param::string("cpu");
    let memory = Param::string("memory").default("128Mi");
    let def = TraitDefinition::new("resource")
        .description("Set resources")
        .applies_to(["deployments.apps"])
        .pod_disruptive(true)
        .params([cpu.clone(), memory.clone()])
        .template(|tpl| {
            tpl.patch(
                patch()
                    .set("spec.template.spec.containers[0].resources.limits.memory", &memory)
                    .set_if(
                        cpu.is_set(),
                        "spec.template.spec.containers[0].resources.limits.cpu",
                        &cpu,
                    )
                    .directive(
                        "spec.template.spec.containers",
                        Directive::PatchKey("name".to_owned()),
                    ),
            );
        });
    similar_asserts::assert_eq!(
        generator().generate_trait(&def),
        indoc! {r#"
            resource: {
                type: "trait"
                annotations: {}
                labels: {}
                description: "Set resources"
                attributes: {
                    podDisruptive: true
                    appliesToWorkloads: ["deployments.apps"]
                }
            }
            template: {
                patch: {
                    spec: {
                        template: {
                            spec: {
                                // +patchKey=name
                                containers: [{
                                    resources: {
                                        limits: {
                                            memory: parameter.memory
                                            if parameter["cpu"] != _|_ {
                                                cpu: parameter.cpu
                                            }
                                        }
                                    }
                                }]
                            }
                        }
                    }
                }
                parameter: {
                    cpu?: string
                    memory: *"128Mi" | string
                }
            }
        "#}
    );
}

#[test]
fn test_generation_is_deterministic() {
    init_logging();
    let def = Definition::from(webservice());
    let gen = CueGenerator::new();
    assert_eq!(gen.generate(&def), gen.generate(&def));
}

#[test]
fn test_quoted_definition_name() {
    let def = ComponentDefinition::new("my-service")
        .description("Service with dash")
        .workload("apps/v1", "Deployment");
    let out = CueGenerator::new().generate_component(&def);
    assert!(out.starts_with("\"my-service\": {\n"), "got:\n{}", out);
}

#[test]
fn test_workload_type_inference() {
    let cases = [
        ("apps/v1", "Deployment", "deployments.apps"),
        ("apps/v1", "StatefulSet", "statefulsets.apps"),
        ("apps/v1", "DaemonSet", "daemonsets.apps"),
        ("batch/v1", "Job", "jobs.batch"),
        ("batch/v1", "CronJob", "cronjobs.batch"),
        ("v1", "Pod", "pods"),
    ];
    for (api_version, kind, expected) in cases {
        let def = ComponentDefinition::new("test").workload(api_version, kind);
        let out = CueGenerator::new().generate_component(&def);
        assert!(
            out.contains(&format!("type: \"{}\"", expected)),
            "expected workload type {} for {}/{} in:\n{}",
            expected,
            api_version,
            kind,
            out
        );
    }
}

#[test]
fn test_autodetect_workload() {
    let def = ComponentDefinition::new("raw").autodetect_workload();
    let out = CueGenerator::new().generate_component(&def);
    assert!(out.contains("type: \"autodetects.core.oam.dev\""));
    assert!(!out.contains("definition: {"));
}

#[test]
fn test_status_block() {
    let def = ComponentDefinition::new("test")
        .workload("apps/v1", "Deployment")
        .custom_status("message: \"Ready\"")
        .health_policy("isHealth: true");
    let out = generator().generate_component(&def);
    let expected = concat!(
        "        status: {\n",
        "            customStatus: #\"\"\"\n",
        "                message: \"Ready\"\n",
        "                \"\"\"#\n",
        "            healthPolicy: #\"\"\"\n",
        "                isHealth: true\n",
        "                \"\"\"#\n",
        "        }\n",
    );
    assert!(out.contains(expected), "got:\n{}", out);
}

#[test]
fn test_labels_annotations_and_conflicts() {
    let def = TraitDefinition::new("scaler")
        .label("ui-hidden", "true")
        .annotation("app.oam.dev/owner", "platform")
        .conflicts_with(["hpa"]);
    let out = CueGenerator::new().generate_trait(&def);
    assert!(out.contains("\"app.oam.dev/owner\": \"platform\""));
    assert!(out.contains("\"ui-hidden\": \"true\""));
    assert!(out.contains("conflictsWith: [\"hpa\"]"));
    assert!(out.contains("podDisruptive: false"));
    assert!(!out.contains("appliesToWorkloads"));
}

#[test]
fn test_imports_are_detected_sorted_and_merged() {
    let port = Param::int("port").default(80);
    let def = ComponentDefinition::new("svc")
        .workload("v1", "Service")
        .imports(["encoding/json", "strconv"])
        .params([port.clone()])
        .template(|tpl| {
            tpl.output(
                resource("v1", "Service").set("metadata.annotations.port", strconv_format_int(&port, 10)),
            );
        });
    let out = CueGenerator::new().generate_component(&def);
    assert!(
        out.starts_with("import (\n\t\"encoding/json\"\n\t\"strconv\"\n)\n\nsvc: {\n"),
        "got:\n{}",
        out
    );
    assert_eq!(out.matches("\"strconv\"").count(), 1);
}

#[test]
fn test_header_comment() {
    let gen = CueGenerator::new().with_config(GeneratorConfig {
        header: Some("Code generated by defkit. DO NOT EDIT.".to_owned()),
        ..GeneratorConfig::default()
    });
    let out = gen.generate_component(&ComponentDefinition::new("x").workload("v1", "Pod"));
    assert!(out.starts_with("// Code generated by defkit. DO NOT EDIT.\n\nx: {\n"));
    assert!(out.ends_with("}\n"));
}

#[test]
fn test_parameter_schema_alone() {
    let out = generator().parameter_schema(&[
        Param::string("image").required(),
        Param::string_list("cmd"),
    ]);
    similar_asserts::assert_eq!(
        out,
        indoc! {"
            parameter: {
                image: string
                cmd?: [...string]
            }
        "}
    );
    assert_eq!(CueGenerator::new().parameter_schema(&[]), "parameter: {}\n");
}
