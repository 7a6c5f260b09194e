//! Decides the order in which ports are fed to the scan queue.
use crate::input::ScanOrder;
use rand::rng;
use rand::seq::SliceRandom;

/// Represents the order ports are handed to the workers in.
///
/// Workers drain the queue concurrently, so this only shapes the order
/// probes are started in, not the order results come back.
#[derive(Debug)]
pub enum PortStrategy {
    Serial(Vec<u16>),
    Random(Vec<u16>),
}

impl PortStrategy {
    pub fn pick(ports: Vec<u16>, order: ScanOrder) -> Self {
        match order {
            ScanOrder::Serial => Self::Serial(ports),
            ScanOrder::Random => Self::Random(ports),
        }
    }

    pub fn order(self) -> Vec<u16> {
        match self {
            Self::Serial(ports) => ports,
            Self::Random(mut ports) => {
                ports.shuffle(&mut rng());
                ports
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::PortStrategy;
    use crate::input::ScanOrder;

    #[test]
    fn serial_strategy_keeps_input_order() {
        let strategy = PortStrategy::pick(vec![443, 22, 80, 22], ScanOrder::Serial);
        assert_eq!(strategy.order(), vec![443, 22, 80, 22]);
    }

    #[test]
    fn random_strategy_is_a_permutation() {
        let expected: Vec<u16> = (1..1_000).collect();
        let strategy = PortStrategy::pick(expected.clone(), ScanOrder::Random);
        let mut result = strategy.order();

        assert_ne!(expected, result);
        result.sort_unstable();
        assert_eq!(expected, result);
    }

    #[test]
    fn random_strategy_keeps_duplicates() {
        let strategy = PortStrategy::pick(vec![80, 80, 443], ScanOrder::Random);
        let mut result = strategy.order();
        result.sort_unstable();
        assert_eq!(result, vec![80, 80, 443]);
    }
}
