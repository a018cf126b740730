// prism_core/src/scan/section.rs

use std::ops::Range;

use crate::error::{LidarError, Result};

/// The slice of the ray grid that is cast during one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanSection {
    /// 1-based, in `1..=total_sections`.
    pub index: usize,
    pub ray_count: usize,
    pub total_sections: usize,
}

impl ScanSection {
    /// Flattened grid indices covered by this section.
    pub fn range(&self) -> Range<usize> {
        let start = (self.index - 1) * self.ray_count;
        start..start + self.ray_count
    }
}

/// Spreads one full sweep over `total_sections` consecutive ticks.
///
/// A sensor sweeping its whole grid `scan_rate_hz` times per second inside a
/// host ticking at `simulation_rate_hz` only needs
/// `grid_size * scan_rate_hz / simulation_rate_hz` rays per tick.
#[derive(Debug, Clone)]
pub struct ScanSectioner {
    ray_count: usize,
    total_sections: usize,
    /// Section handed out by the last `next_section`; 0 before the first call.
    current: usize,
}

impl ScanSectioner {
    pub fn new(grid_size: usize, scan_rate_hz: u32, simulation_rate_hz: u32) -> Result<Self> {
        if simulation_rate_hz == 0 {
            return Err(LidarError::InvalidParameter {
                name: "simulation_rate_hz",
                value: 0.0,
                reason: "must be positive",
            });
        }

        // Widened so the product cannot overflow.
        let ray_count =
            (grid_size as u128 * scan_rate_hz as u128 / simulation_rate_hz as u128) as usize;
        if ray_count == 0 {
            return Err(LidarError::EmptySection {
                grid_size,
                scan_rate_hz,
                simulation_rate_hz,
            });
        }
        if ray_count > grid_size || grid_size % ray_count != 0 {
            return Err(LidarError::IndivisibleSections {
                grid_size,
                ray_count,
            });
        }

        Ok(Self {
            ray_count,
            total_sections: grid_size / ray_count,
            current: 0,
        })
    }

    /// Advances to the following section, wrapping to 1 after the last one.
    pub fn next_section(&mut self) -> ScanSection {
        self.current = self.current % self.total_sections + 1;
        self.section()
    }

    /// The section most recently returned by `next_section` (section 1 before any call).
    pub fn section(&self) -> ScanSection {
        ScanSection {
            index: self.current.max(1),
            ray_count: self.ray_count,
            total_sections: self.total_sections,
        }
    }

    pub fn ray_count(&self) -> usize {
        self.ray_count
    }

    pub fn total_sections(&self) -> usize {
        self.total_sections
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn tiny_grid_alternates_between_two_sections() {
        // 4 x 2 grid, half of it per tick.
        let mut sectioner = ScanSectioner::new(8, 1, 2).unwrap();
        assert_eq!(sectioner.ray_count(), 4);
        assert_eq!(sectioner.total_sections(), 2);

        let indices: Vec<usize> = (0..6).map(|_| sectioner.next_section().index).collect();
        assert_eq!(indices, vec![1, 2, 1, 2, 1, 2]);

        let first = ScanSection { index: 1, ray_count: 4, total_sections: 2 };
        let second = ScanSection { index: 2, ray_count: 4, total_sections: 2 };
        assert_eq!(first.range(), 0..4);
        assert_eq!(second.range(), 4..8);
    }

    #[test_case(14_400, 10, 50 ; "mid360 at 50 Hz")]
    #[test_case(14_400, 10, 100 ; "mid360 at 100 Hz")]
    #[test_case(8, 1, 1 ; "whole grid every tick")]
    #[test_case(36, 1, 6 ; "six sections")]
    fn one_cycle_covers_the_grid_exactly_once(grid_size: usize, scan: u32, sim: u32) {
        let mut sectioner = ScanSectioner::new(grid_size, scan, sim).unwrap();
        let total = sectioner.total_sections();

        let mut seen_sections = vec![false; total];
        let mut covered = vec![0u32; grid_size];
        for _ in 0..total {
            let section = sectioner.next_section();
            assert!(!seen_sections[section.index - 1], "section {} repeated", section.index);
            seen_sections[section.index - 1] = true;
            for i in section.range() {
                covered[i] += 1;
            }
        }

        assert!(seen_sections.iter().all(|s| *s));
        assert!(covered.iter().all(|c| *c == 1));
        // The next call starts the following sweep.
        assert_eq!(sectioner.next_section().index, 1);
    }

    #[test]
    fn rejects_zero_rays_per_tick() {
        assert!(matches!(
            ScanSectioner::new(8, 1, 100),
            Err(LidarError::EmptySection { .. })
        ));
    }

    #[test]
    fn rejects_uneven_sections() {
        // 10 * 1 / 3 = 3 rays per tick, which leaves one ray over.
        assert!(matches!(
            ScanSectioner::new(10, 1, 3),
            Err(LidarError::IndivisibleSections { grid_size: 10, ray_count: 3 })
        ));
    }

    #[test]
    fn rejects_scan_faster_than_the_host() {
        assert!(ScanSectioner::new(8, 4, 2).is_err());
    }
}
