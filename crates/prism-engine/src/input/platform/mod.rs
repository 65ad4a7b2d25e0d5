mod winit;
