pub mod inpaint_service_refiner;
pub mod local_inpaint_refiner;
