pub mod edge_refiner;
pub mod refinement_mask;
