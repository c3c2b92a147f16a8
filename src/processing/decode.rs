use std::fs;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};

use fast_image_resize as fir;
use image::{ImageFormat, ImageReader, Limits};
use jpeg_decoder::{Decoder as JpegDecoder, PixelFormat};
use tracing::debug;

use crate::buffer::{AlphaMode, PixelBuffer};
use crate::error::Error;
use crate::processing::sample::sampled_dimensions;

/// Header-only view of an image: dimensions and sniffed format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Probe {
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
    pub format: Option<ImageFormat>,
}

/// Read the image header without decoding pixel data.
pub fn probe(path: &Path) -> Result<Probe, Error> {
    let reader = open(path)?.with_guessed_format()?;
    let format = reader.format();
    let (width, height) = reader.into_dimensions().map_err(|source| Error::Decode {
        path: path.to_path_buf(),
        source,
    })?;
    if width == 0 || height == 0 {
        return Err(Error::EmptyImage(path.to_path_buf()));
    }
    Ok(Probe {
        path: path.to_path_buf(),
        width,
        height,
        format,
    })
}

/// Decode the probed image to RGBA8 at `1 / sample` of its size.
///
/// The output is exactly [`sampled_dimensions`]. Decoders run with their
/// defaults: no density rescale, no dithering, and the alpha convention they
/// produce is kept as-is on the returned buffer.
///
/// JPEG scales in the DCT domain and non-interlaced PNG is box-filtered row
/// by row, so neither holds the full-size image in memory. Everything else
/// decodes at full size under limits sized from the header, then resizes.
pub fn decode_sampled(probe: &Probe, sample: u32) -> Result<PixelBuffer, Error> {
    let (target_w, target_h) = sampled_dimensions(probe.width, probe.height, sample);

    let streamed = match probe.format {
        Some(ImageFormat::Jpeg) if sample > 1 => {
            Some(decode_jpeg_scaled(&probe.path, target_w, target_h))
        }
        Some(ImageFormat::Png) => Some(decode_png_sampled(&probe.path, sample, target_w, target_h)),
        _ => None,
    };
    match streamed {
        Some(Ok(buffer)) => return Ok(buffer),
        Some(Err(err)) => {
            debug!(
                "scaled decode of {} failed, falling back: {err}",
                probe.path.display()
            );
        }
        None => {}
    }

    let mut reader = open(&probe.path)?.with_guessed_format()?;
    reader.limits(decode_limits(probe));
    let rgba = reader
        .decode()
        .map_err(|source| Error::Decode {
            path: probe.path.clone(),
            source,
        })?
        .into_rgba8();
    let (width, height) = rgba.dimensions();
    let pixels = if (width, height) == (target_w, target_h) {
        rgba.into_raw()
    } else {
        resize_rgba(width, height, rgba.as_raw(), target_w, target_h)?
    };
    PixelBuffer::from_rgba(target_w, target_h, AlphaMode::Straight, pixels)
        .ok_or_else(|| Error::NoPixels(probe.path.clone()))
}

/// Allocation limits for a full-size decode of `probe`.
///
/// The default cap (512 MiB) rejects large photos outright; the header
/// already tells us how much the decoder needs, so the cap follows it.
fn decode_limits(probe: &Probe) -> Limits {
    let mut limits = Limits::default();
    let rgba_bytes = u64::from(probe.width) * u64::from(probe.height) * 4;
    // decoders may keep their native buffer alongside the RGBA copy
    let needed = rgba_bytes.saturating_mul(2);
    limits.max_alloc = limits.max_alloc.map(|cap| cap.max(needed));
    limits
}

fn open(path: &Path) -> Result<ImageReader<BufReader<fs::File>>, Error> {
    ImageReader::open(path).map_err(|err| match err.kind() {
        io::ErrorKind::NotFound => Error::MissingFile(path.to_path_buf()),
        _ => Error::Io(err),
    })
}

/// DCT-domain downscale, then an exact resize down to the target.
fn decode_jpeg_scaled(path: &Path, target_w: u32, target_h: u32) -> Result<PixelBuffer, Error> {
    let file = fs::File::open(path)?;
    let mut decoder = JpegDecoder::new(BufReader::new(file));
    let request_w = target_w.clamp(1, u16::MAX as u32) as u16;
    let request_h = target_h.clamp(1, u16::MAX as u32) as u16;
    decoder.scale(request_w, request_h)?;
    let pixels = decoder.decode()?;
    let info = decoder
        .info()
        .ok_or_else(|| Error::NoPixels(path.to_path_buf()))?;
    let width = u32::from(info.width);
    let height = u32::from(info.height);

    let rgba = match info.pixel_format {
        PixelFormat::RGB24 => {
            let mut rgba = Vec::with_capacity(pixels.len() / 3 * 4);
            for chunk in pixels.chunks_exact(3) {
                rgba.extend_from_slice(&[chunk[0], chunk[1], chunk[2], 255]);
            }
            rgba
        }
        PixelFormat::L8 => {
            let mut rgba = Vec::with_capacity(pixels.len() * 4);
            for &v in &pixels {
                rgba.extend_from_slice(&[v, v, v, 255]);
            }
            rgba
        }
        PixelFormat::CMYK32 => {
            let mut rgba = Vec::with_capacity(pixels.len());
            for chunk in pixels.chunks_exact(4) {
                let k = f32::from(chunk[3]) / 255.0;
                let channel = |v: u8| {
                    let c = f32::from(v) / 255.0 * (1.0 - k) + k;
                    ((1.0 - c) * 255.0).round().clamp(0.0, 255.0) as u8
                };
                rgba.extend_from_slice(&[
                    channel(chunk[0]),
                    channel(chunk[1]),
                    channel(chunk[2]),
                    255,
                ]);
            }
            rgba
        }
        PixelFormat::L16 => {
            return Err(Error::Unsupported(
                "16-bit grayscale JPEG in scaled decoder".into(),
            ));
        }
    };

    let pixels = if (width, height) == (target_w, target_h) {
        rgba
    } else {
        resize_rgba(width, height, &rgba, target_w, target_h)?
    };
    PixelBuffer::from_rgba(target_w, target_h, AlphaMode::Straight, pixels)
        .ok_or_else(|| Error::NoPixels(path.to_path_buf()))
}

/// Stream PNG rows through a `sample × sample` box filter.
///
/// Peak memory is one source row plus one row of accumulators. Interlaced
/// files deliver rows out of order and are left to the full decoder.
fn decode_png_sampled(
    path: &Path,
    sample: u32,
    target_w: u32,
    target_h: u32,
) -> Result<PixelBuffer, Error> {
    let file = fs::File::open(path)?;
    let mut decoder = png::Decoder::new(BufReader::new(file));
    decoder.set_transformations(png::Transformations::normalize_to_color8());
    let mut reader = decoder.read_info()?;
    if reader.info().interlaced {
        return Err(Error::Unsupported("interlaced PNG in row decoder".into()));
    }
    let (color, _) = reader.output_color_type();

    let sample = sample.max(1);
    let mut sampler = BoxSampler::new(sample, target_w, target_h);
    let mut rgba = Vec::new();
    let mut y = 0u32;
    while y / sample < target_h {
        let Some(row) = reader.next_row()? else { break };
        expand_png_row(color, row.data(), &mut rgba)?;
        sampler.push_row(y, &rgba);
        y += 1;
    }
    PixelBuffer::from_rgba(target_w, target_h, AlphaMode::Straight, sampler.finish())
        .ok_or_else(|| Error::NoPixels(path.to_path_buf()))
}

fn expand_png_row(color: png::ColorType, data: &[u8], out: &mut Vec<u8>) -> Result<(), Error> {
    out.clear();
    match color {
        png::ColorType::Rgba => out.extend_from_slice(data),
        png::ColorType::Rgb => {
            for px in data.chunks_exact(3) {
                out.extend_from_slice(&[px[0], px[1], px[2], 255]);
            }
        }
        png::ColorType::GrayscaleAlpha => {
            for px in data.chunks_exact(2) {
                out.extend_from_slice(&[px[0], px[0], px[0], px[1]]);
            }
        }
        png::ColorType::Grayscale => {
            for &v in data {
                out.extend_from_slice(&[v, v, v, 255]);
            }
        }
        png::ColorType::Indexed => {
            return Err(Error::Unsupported("unexpanded palette PNG row".into()));
        }
    }
    Ok(())
}

#[derive(Debug, Default, Clone, Copy)]
struct BoxSum {
    weighted: [u64; 3],
    plain: [u64; 3],
    alpha: u64,
    count: u64,
}

/// Accumulates straight RGBA rows into one output row per band of `sample`
/// source rows. Columns and rows past `target * sample` are dropped.
struct BoxSampler {
    sample: u32,
    band: Option<u32>,
    sums: Vec<BoxSum>,
    out: Vec<u8>,
}

impl BoxSampler {
    fn new(sample: u32, target_w: u32, target_h: u32) -> Self {
        Self {
            sample: sample.max(1),
            band: None,
            sums: vec![BoxSum::default(); target_w as usize],
            out: Vec::with_capacity(target_w as usize * target_h as usize * 4),
        }
    }

    fn push_row(&mut self, y: u32, rgba: &[u8]) {
        let band = y / self.sample;
        if self.band.is_some_and(|current| current != band) {
            self.flush();
        }
        self.band = Some(band);

        let step = self.sample as usize;
        for (x, px) in rgba.chunks_exact(4).enumerate() {
            let Some(sum) = self.sums.get_mut(x / step) else {
                break;
            };
            let a = u64::from(px[3]);
            for c in 0..3 {
                sum.weighted[c] += u64::from(px[c]) * a;
                sum.plain[c] += u64::from(px[c]);
            }
            sum.alpha += a;
            sum.count += 1;
        }
    }

    // color is alpha-weighted so transparent pixels don't bleed into the
    // average; a fully transparent box keeps its plain color average
    fn flush(&mut self) {
        let avg = |total: u64, n: u64| ((total + n / 2) / n).min(255) as u8;
        for sum in &mut self.sums {
            let count = sum.count.max(1);
            let (totals, n) = if sum.alpha > 0 {
                (sum.weighted, sum.alpha)
            } else {
                (sum.plain, count)
            };
            self.out.extend_from_slice(&[
                avg(totals[0], n),
                avg(totals[1], n),
                avg(totals[2], n),
                avg(sum.alpha, count),
            ]);
            *sum = BoxSum::default();
        }
    }

    fn finish(mut self) -> Vec<u8> {
        if self.band.is_some() {
            self.flush();
        }
        self.out
    }
}

/// Area-averaging resize of straight RGBA8 pixels.
fn resize_rgba(
    src_w: u32,
    src_h: u32,
    src: &[u8],
    target_w: u32,
    target_h: u32,
) -> Result<Vec<u8>, Error> {
    let src_view = fir::images::ImageRef::new(src_w, src_h, src, fir::PixelType::U8x4)
        .map_err(|err| Error::Resize(err.to_string()))?;
    let mut dst_image = fir::images::Image::new(target_w, target_h, fir::PixelType::U8x4);
    let options = fir::ResizeOptions::new()
        .resize_alg(fir::ResizeAlg::Convolution(fir::FilterType::Box));
    fir::Resizer::new()
        .resize(&src_view, &mut dst_image, Some(&options))
        .map_err(|err| Error::Resize(err.to_string()))?;
    Ok(dst_image.into_vec())
}
