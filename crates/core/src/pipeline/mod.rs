pub mod edge_refinement_stage;
pub mod extract_lens_use_case;
pub mod lens_compositing_pipeline;
pub mod pipeline_logger;
pub mod replace_lens_use_case;
