use super::{BakeConfig, VertexNormal};

/// Applies the length policy of `config` to every vertex normal in place.
pub fn normalize_lengths(normals: &mut [VertexNormal], config: &BakeConfig) {
    if config.force_unit_length {
        force_unit(normals);
        return;
    }

    clamp_lengths(normals, config.length_limit);
    if config.normalize_to_max {
        rescale_to_max(normals);
    }
}

pub fn force_unit(normals: &mut [VertexNormal]) {
    for normal in normals {
        normal.length = 1.0;
    }
}

pub fn clamp_lengths(normals: &mut [VertexNormal], limit: f32) {
    for normal in normals {
        normal.length = normal.length.min(limit);
    }
}

/// Divides every length by the largest one. No-op when all lengths are zero.
pub fn rescale_to_max(normals: &mut [VertexNormal]) {
    let max = max_length(normals);
    if max > 0.0 {
        for normal in normals {
            normal.length /= max;
        }
    }
}

pub fn max_length(normals: &[VertexNormal]) -> f32 {
    normals
        .iter()
        .map(|normal| normal.length)
        .fold(0.0, f32::max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bake::Strategy;
    use glam::Vec3;

    fn with_lengths(lengths: &[f32]) -> Vec<VertexNormal> {
        lengths
            .iter()
            .map(|&length| VertexNormal::new(Vec3::Z, length))
            .collect()
    }

    fn lengths(normals: &[VertexNormal]) -> Vec<f32> {
        normals.iter().map(|normal| normal.length).collect()
    }

    #[test]
    fn test_clamp_monotonic() {
        let input = [0.0, 0.5, 1.0, 1.2, 1.5, 7.0];
        for limit in [0.0, 0.75, 1.0, 1.5, 10.0] {
            let mut normals = with_lengths(&input);
            clamp_lengths(&mut normals, limit);
            for (before, after) in input.iter().zip(lengths(&normals)) {
                assert!(after <= limit);
                if *before <= limit {
                    assert_eq!(after, *before);
                }
            }
        }
    }

    #[test]
    fn test_rescale_to_max_idempotent() {
        let mut normals = with_lengths(&[0.3, 1.7, 1.2]);
        rescale_to_max(&mut normals);
        let once = lengths(&normals);
        assert_eq!(max_length(&normals), 1.0);

        rescale_to_max(&mut normals);
        assert_eq!(lengths(&normals), once);
        assert_eq!(max_length(&normals), 1.0);
    }

    #[test]
    fn test_rescale_all_zero_is_noop() {
        let mut normals = with_lengths(&[0.0, 0.0]);
        rescale_to_max(&mut normals);
        assert_eq!(lengths(&normals), vec![0.0, 0.0]);

        let mut empty: Vec<VertexNormal> = Vec::new();
        rescale_to_max(&mut empty);
        assert!(empty.is_empty());
    }

    #[test]
    fn test_force_unit_ignores_other_options() {
        let config = BakeConfig {
            strategy: Strategy::AngleWeight,
            force_unit_length: true,
            length_limit: 0.25,
            normalize_to_max: true,
        };
        let mut normals = with_lengths(&[0.1, 1.4142, 3.0]);
        normalize_lengths(&mut normals, &config);
        assert_eq!(lengths(&normals), vec![1.0, 1.0, 1.0]);
        assert!(normals.iter().all(|normal| normal.direction == Vec3::Z));
    }

    #[test]
    fn test_clamp_then_rescale() {
        let config = BakeConfig {
            strategy: Strategy::AngleWeight,
            force_unit_length: false,
            length_limit: 1.5,
            normalize_to_max: true,
        };
        let mut normals = with_lengths(&[0.75, 1.5, 3.0]);
        normalize_lengths(&mut normals, &config);
        assert_eq!(lengths(&normals), vec![0.5, 1.0, 1.0]);
    }

    #[test]
    fn test_clamp_only() {
        let config = BakeConfig {
            strategy: Strategy::Average,
            force_unit_length: false,
            length_limit: 1.2,
            normalize_to_max: false,
        };
        let mut normals = with_lengths(&[0.5, 1.4]);
        normalize_lengths(&mut normals, &config);
        assert_eq!(lengths(&normals), vec![0.5, 1.2]);
    }
}
