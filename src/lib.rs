// scriptbundle - script bundle construction with source maps

pub mod js;
