mod console;

pub use console::ConsolePrompt;
