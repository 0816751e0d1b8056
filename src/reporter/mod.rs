pub mod json;
pub mod terminal;

use crate::aggregator::ModuleResult;

pub trait Reporter {
    fn report(&self, results: &[ModuleResult]) -> String;
}
