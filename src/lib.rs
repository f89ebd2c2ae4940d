pub mod api_connection;
pub mod change_explainer;
pub mod chat_refiner;
pub mod cli;
pub mod craving_assistant;
pub mod craving_pipeline;
pub mod craving_signals;
pub mod meal_planner;
pub mod recipe_hydrator;
pub mod recipe_model;
pub mod recipe_retrieval;
pub mod recipe_scoring;
pub mod text_processing;
