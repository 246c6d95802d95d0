use eagle_core::{Container, Pod, Resource, Result};

/// Compute the resource request of a pod.
///
/// Regular containers run together, so their requests are summed. Init
/// containers run one at a time before them, so only the largest of them has
/// to fit: each component becomes `max(sum of containers, init container)`.
/// When pod overhead accounting is on, the overhead is added on top.
pub fn compute_pod_resource_request(pod: &Pod, pod_overhead: bool) -> Result<Resource> {
    let mut result = Resource::default();

    let Some(spec) = &pod.spec else {
        return Ok(result);
    };

    for container in &spec.containers {
        if let Some(requests) = container_requests(container) {
            result.add(requests)?;
        }
    }

    // take max_resource(sum_pod, any_init_container)
    for container in spec.init_containers.iter().flatten() {
        if let Some(requests) = container_requests(container) {
            result.set_max_resource(requests)?;
        }
    }

    if pod_overhead {
        if let Some(overhead) = &spec.overhead {
            result.add(overhead)?;
        }
    }

    Ok(result)
}

fn container_requests(container: &Container) -> Option<&eagle_core::ResourceList> {
    container.resources.as_ref()?.requests.as_ref()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use eagle_core::{EagleError, Quantity, QuantityError, ResourceList};
    use k8s_openapi::api::core::v1::{PodSpec, ResourceRequirements};

    pub(crate) fn resource_list(entries: &[(&str, &str)]) -> ResourceList {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), Quantity(v.to_string())))
            .collect()
    }

    pub(crate) fn container(name: &str, requests: &[(&str, &str)]) -> Container {
        Container {
            name: name.to_string(),
            resources: Some(ResourceRequirements {
                requests: Some(resource_list(requests)),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    fn pod_with(
        containers: Vec<Container>,
        init_containers: Vec<Container>,
        overhead: Option<&[(&str, &str)]>,
    ) -> Pod {
        let mut pod = Pod::default();
        pod.metadata.name = Some("test-pod".to_string());
        pod.spec = Some(PodSpec {
            containers,
            init_containers: Some(init_containers),
            overhead: overhead.map(resource_list),
            ..Default::default()
        });
        pod
    }

    #[test]
    fn test_sums_regular_containers() {
        let pod = pod_with(
            vec![
                container("a", &[("cpu", "500m"), ("memory", "256Mi")]),
                container("b", &[("cpu", "250m"), ("example.com/foo", "2")]),
                container("c", &[]),
            ],
            vec![],
            None,
        );

        let r = compute_pod_resource_request(&pod, true).unwrap();
        assert_eq!(r.milli_cpu, 750);
        assert_eq!(r.memory, 256 * 1024 * 1024);
        assert_eq!(r.scalar("example.com/foo"), 2);
    }

    #[test]
    fn test_init_containers_take_component_max() {
        let pod = pod_with(
            vec![
                container("a", &[("cpu", "500m"), ("memory", "256Mi")]),
                container("b", &[("cpu", "500m"), ("memory", "256Mi")]),
            ],
            vec![
                container("init-cpu", &[("cpu", "2"), ("memory", "64Mi")]),
                container("init-mem", &[("cpu", "100m"), ("memory", "1Gi")]),
            ],
            None,
        );

        let r = compute_pod_resource_request(&pod, true).unwrap();
        assert_eq!(r.milli_cpu, 2000);
        assert_eq!(r.memory, 1024 * 1024 * 1024);
    }

    #[test]
    fn test_overhead_only_when_enabled() {
        let overhead: &[(&str, &str)] = &[("cpu", "100m"), ("memory", "1Ti")];
        let pod = pod_with(
            vec![container("a", &[("cpu", "1"), ("memory", "1Gi")])],
            vec![],
            Some(overhead),
        );

        let enabled = compute_pod_resource_request(&pod, true).unwrap();
        assert_eq!(enabled.milli_cpu, 1100);

        let disabled = compute_pod_resource_request(&pod, false).unwrap();
        let without_overhead = compute_pod_resource_request(
            &pod_with(
                vec![container("a", &[("cpu", "1"), ("memory", "1Gi")])],
                vec![],
                None,
            ),
            true,
        )
        .unwrap();
        assert_eq!(disabled, without_overhead);
    }

    #[test]
    fn test_container_order_does_not_matter() {
        let a = container("a", &[("cpu", "300m"), ("memory", "1Gi")]);
        let b = container("b", &[("cpu", "700m"), ("example.com/foo", "1")]);
        let i1 = container("i1", &[("cpu", "1500m")]);
        let i2 = container("i2", &[("memory", "3Gi"), ("example.com/foo", "4")]);

        let forward = pod_with(
            vec![a.clone(), b.clone()],
            vec![i1.clone(), i2.clone()],
            None,
        );
        let reversed = pod_with(vec![b, a], vec![i2, i1], None);

        assert_eq!(
            compute_pod_resource_request(&forward, true).unwrap(),
            compute_pod_resource_request(&reversed, true).unwrap()
        );
    }

    #[test]
    fn test_pod_without_spec_requests_nothing() {
        let r = compute_pod_resource_request(&Pod::default(), true).unwrap();
        assert!(r.is_zero());
    }

    #[test]
    fn test_invalid_quantity_fails() {
        let pod = pod_with(vec![container("a", &[("cpu", "fast")])], vec![], None);
        assert!(compute_pod_resource_request(&pod, true).is_err());
    }

    #[test]
    fn test_request_sum_overflow_is_an_error() {
        let pod = pod_with(
            vec![
                container("a", &[("memory", "5Ei")]),
                container("b", &[("memory", "5Ei")]),
            ],
            vec![],
            None,
        );
        assert!(matches!(
            compute_pod_resource_request(&pod, true),
            Err(EagleError::ResourceOverflow { .. })
        ));
    }

    #[test]
    fn test_negative_request_is_rejected() {
        let negative = pod_with(vec![container("a", &[("cpu", "-4")])], vec![], None);
        assert!(matches!(
            compute_pod_resource_request(&negative, true),
            Err(EagleError::InvalidQuantity {
                source: QuantityError::Negative(_),
                ..
            })
        ));

        let negative_init = pod_with(
            vec![container("a", &[("cpu", "1")])],
            vec![container("init", &[("memory", "-1Gi")])],
            None,
        );
        assert!(compute_pod_resource_request(&negative_init, true).is_err());
    }
}
