mod parsed_path;
mod types;
